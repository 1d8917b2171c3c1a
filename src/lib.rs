#![warn(
    clippy::pedantic,
    future_incompatible,
    missing_debug_implementations,
    missing_docs,
    rust_2018_idioms,
    rust_2021_compatibility
)]
#![cfg_attr(docsrs, feature(doc_auto_cfg, doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]

//! A header-class-file compiler: given a parsed Java compilation unit, binds
//! every declaration's ABI-visible shape (supertypes, member signatures,
//! constant values, annotations) without ever lowering a method body, and
//! emits the resulting `.class` files.
//! ## Features
#![doc = document_features::document_features!()]

pub mod ast;
pub mod bound;
pub mod canonicalize;
pub mod classfile;
pub mod classpath;
pub mod collab;
pub mod const_eval;
pub mod diagnostic;
pub mod driver;
pub mod env;
pub mod hierarchy;
pub mod index;
pub mod lower;
pub mod preprocess;
pub mod sym;
pub mod type_binder;
pub mod types;
