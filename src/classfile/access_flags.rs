//! Access flag bitsets (JVMS §4.1 Table 4.1-A, §4.5 Table 4.5-A, §4.6 Table
//! 4.6-A, §4.7.6 Table 4.7.6-A), ported from the teacher's `bitflags!` blocks
//! in `jvm::class`, `jvm::field`, and a sibling for methods it keeps next to
//! `jvm::class_loader`.
use bitflags::bitflags;

bitflags! {
    /// Access flags of a class or interface (JVMS Table 4.1-A).
    #[derive(Debug, PartialEq, Eq, Clone, Copy)]
    pub struct ClassAccessFlags: u16 {
        /// `public`.
        const PUBLIC = 0x0001;
        /// `final`.
        const FINAL = 0x0010;
        /// Treat superclass methods specially when invoked by `invokespecial`.
        const SUPER = 0x0020;
        /// An interface, not a class.
        const INTERFACE = 0x0200;
        /// `abstract`.
        const ABSTRACT = 0x0400;
        /// Synthesized; not present in source.
        const SYNTHETIC = 0x1000;
        /// An annotation interface.
        const ANNOTATION = 0x2000;
        /// An enum class.
        const ENUM = 0x4000;
        /// A module, not a class or interface.
        const MODULE = 0x8000;
    }
}

bitflags! {
    /// Access flags of a nested class entry in `InnerClasses` (JVMS Table
    /// 4.7.6-A).
    #[derive(Debug, PartialEq, Eq, Clone, Copy)]
    pub struct NestedClassAccessFlags: u16 {
        /// Marked or implicitly `public` in source.
        const PUBLIC = 0x0001;
        /// Marked `private` in source.
        const PRIVATE = 0x0002;
        /// Marked `protected` in source.
        const PROTECTED = 0x0004;
        /// Marked or implicitly `static` in source.
        const STATIC = 0x0008;
        /// Marked `final` in source.
        const FINAL = 0x0010;
        /// Was an `interface` in source.
        const INTERFACE = 0x0200;
        /// Marked or implicitly `abstract` in source.
        const ABSTRACT = 0x0400;
        /// Synthesized; not present in source.
        const SYNTHETIC = 0x1000;
        /// An annotation interface.
        const ANNOTATION = 0x2000;
        /// An enum class.
        const ENUM = 0x4000;
    }
}

bitflags! {
    /// Access flags of a field (JVMS Table 4.5-A).
    #[derive(Debug, PartialEq, Eq, Clone, Copy)]
    pub struct FieldAccessFlags: u16 {
        /// `public`.
        const PUBLIC = 0x0001;
        /// `private`.
        const PRIVATE = 0x0002;
        /// `protected`.
        const PROTECTED = 0x0004;
        /// `static`.
        const STATIC = 0x0008;
        /// `final`.
        const FINAL = 0x0010;
        /// `volatile`.
        const VOLATILE = 0x0040;
        /// `transient`.
        const TRANSIENT = 0x0080;
        /// Synthesized; not present in source.
        const SYNTHETIC = 0x1000;
        /// An enum constant.
        const ENUM = 0x4000;
    }
}

bitflags! {
    /// Access flags of a method (JVMS Table 4.6-A).
    #[derive(Debug, PartialEq, Eq, Clone, Copy)]
    pub struct MethodAccessFlags: u16 {
        /// `public`.
        const PUBLIC = 0x0001;
        /// `private`.
        const PRIVATE = 0x0002;
        /// `protected`.
        const PROTECTED = 0x0004;
        /// `static`.
        const STATIC = 0x0008;
        /// `final`.
        const FINAL = 0x0010;
        /// `synchronized`.
        const SYNCHRONIZED = 0x0020;
        /// A bridge method generated by the compiler.
        const BRIDGE = 0x0040;
        /// Declared with a variable arity final parameter.
        const VARARGS = 0x0080;
        /// `native`.
        const NATIVE = 0x0100;
        /// `abstract`.
        const ABSTRACT = 0x0400;
        /// `strictfp`.
        const STRICT = 0x0800;
        /// Synthesized; not present in source.
        const SYNTHETIC = 0x1000;
    }
}
