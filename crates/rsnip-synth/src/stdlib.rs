//! Standard library index
//!
//! Maps a name to every `std` path that could provide it, so snippets
//! can use `HashMap` or `fs::read` without spelling out the import.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// One index entry: a name and the paths it can be imported from.
pub type Entry = (&'static str, &'static [&'static str]);

/// Read-only lookup table from name to candidate import paths.
#[derive(Debug, Clone, Default)]
pub struct StdlibIndex {
    entries: HashMap<&'static str, &'static [&'static str]>,
}

static GLOBAL: Lazy<StdlibIndex> = Lazy::new(|| StdlibIndex::from_entries(STD_ENTRIES));

impl StdlibIndex {
    /// Build an index from a list of entries. Later entries for the same
    /// name replace earlier ones.
    pub fn from_entries(entries: &[Entry]) -> Self {
        Self {
            entries: entries.iter().copied().collect(),
        }
    }

    /// The index of the standard library, built on first use.
    pub fn global() -> &'static StdlibIndex {
        &GLOBAL
    }

    /// Candidate paths for `name`, empty if there are none.
    pub fn lookup(&self, name: &str) -> &'static [&'static str] {
        self.entries.get(name).copied().unwrap_or(&[])
    }
}

/// Names that are always in scope and never need an import: primitive
/// types, the 2021 prelude, the std and core crates and path keywords.
pub fn is_builtin(name: &str) -> bool {
    matches!(
        name,
        // primitives
        "bool" | "char" | "str"
            | "i8" | "i16" | "i32" | "i64" | "i128" | "isize"
            | "u8" | "u16" | "u32" | "u64" | "u128" | "usize"
            | "f32" | "f64"
            // path keywords and crates
            | "self" | "Self" | "super" | "crate" | "std" | "core"
            // prelude
            | "Copy" | "Send" | "Sized" | "Sync" | "Unpin"
            | "Drop" | "Fn" | "FnMut" | "FnOnce" | "drop"
            | "Box" | "ToOwned" | "Clone"
            | "PartialEq" | "PartialOrd" | "Eq" | "Ord"
            | "AsRef" | "AsMut" | "Into" | "From" | "Default"
            | "Iterator" | "Extend" | "IntoIterator"
            | "DoubleEndedIterator" | "ExactSizeIterator"
            | "Option" | "Some" | "None" | "Result" | "Ok" | "Err"
            | "String" | "ToString" | "Vec"
            | "TryFrom" | "TryInto" | "FromIterator"
    )
}

/// Macros usable without an import. Macro names live in their own
/// namespace, so `env!` being built in says nothing about `env::args`.
pub fn is_builtin_macro(name: &str) -> bool {
    matches!(
        name,
        "print" | "println" | "eprint" | "eprintln"
            | "format" | "format_args" | "write" | "writeln"
            | "panic" | "assert" | "assert_eq" | "assert_ne"
            | "debug_assert" | "debug_assert_eq" | "debug_assert_ne"
            | "vec" | "dbg" | "todo" | "unimplemented" | "unreachable"
            | "matches" | "concat" | "stringify" | "line" | "column"
            | "file" | "module_path" | "include" | "include_str"
            | "include_bytes" | "env" | "option_env" | "cfg"
            | "compile_error" | "thread_local" | "macro_rules"
    )
}

static STD_ENTRIES: &[Entry] = &[
    // modules
    ("alloc", &["std::alloc"]),
    ("any", &["std::any"]),
    ("array", &["std::array"]),
    ("ascii", &["std::ascii"]),
    ("borrow", &["std::borrow"]),
    ("cell", &["std::cell"]),
    ("cmp", &["std::cmp"]),
    ("collections", &["std::collections"]),
    ("convert", &["std::convert"]),
    ("env", &["std::env"]),
    ("error", &["std::error"]),
    ("ffi", &["std::ffi"]),
    ("fmt", &["std::fmt"]),
    ("fs", &["std::fs"]),
    ("hash", &["std::hash"]),
    ("hint", &["std::hint"]),
    ("io", &["std::io"]),
    ("iter", &["std::iter"]),
    ("marker", &["std::marker"]),
    ("mem", &["std::mem"]),
    ("mpsc", &["std::sync::mpsc"]),
    ("net", &["std::net"]),
    ("num", &["std::num"]),
    ("ops", &["std::ops"]),
    ("panic", &["std::panic"]),
    ("path", &["std::path"]),
    ("process", &["std::process"]),
    ("ptr", &["std::ptr"]),
    ("rc", &["std::rc"]),
    ("slice", &["std::slice"]),
    ("sync", &["std::sync"]),
    ("thread", &["std::thread"]),
    ("time", &["std::time"]),
    ("atomic", &["std::sync::atomic"]),
    ("consts", &["std::f32::consts", "std::f64::consts"]),
    // collections
    ("BTreeMap", &["std::collections::BTreeMap"]),
    ("BTreeSet", &["std::collections::BTreeSet"]),
    ("BinaryHeap", &["std::collections::BinaryHeap"]),
    ("HashMap", &["std::collections::HashMap"]),
    ("HashSet", &["std::collections::HashSet"]),
    ("LinkedList", &["std::collections::LinkedList"]),
    ("VecDeque", &["std::collections::VecDeque"]),
    (
        "Entry",
        &[
            "std::collections::btree_map::Entry",
            "std::collections::hash_map::Entry",
        ],
    ),
    ("DefaultHasher", &["std::collections::hash_map::DefaultHasher"]),
    ("Reverse", &["std::cmp::Reverse"]),
    // pointers and cells
    ("Rc", &["std::rc::Rc"]),
    ("Arc", &["std::sync::Arc"]),
    ("Weak", &["std::rc::Weak", "std::sync::Weak"]),
    ("Cell", &["std::cell::Cell"]),
    ("RefCell", &["std::cell::RefCell"]),
    ("OnceCell", &["std::cell::OnceCell"]),
    ("Cow", &["std::borrow::Cow"]),
    ("Borrow", &["std::borrow::Borrow"]),
    ("BorrowMut", &["std::borrow::BorrowMut"]),
    ("Pin", &["std::pin::Pin"]),
    ("NonNull", &["std::ptr::NonNull"]),
    ("PhantomData", &["std::marker::PhantomData"]),
    ("PhantomPinned", &["std::marker::PhantomPinned"]),
    // sync
    ("Mutex", &["std::sync::Mutex"]),
    ("RwLock", &["std::sync::RwLock"]),
    ("Condvar", &["std::sync::Condvar"]),
    ("Barrier", &["std::sync::Barrier"]),
    ("Once", &["std::sync::Once"]),
    ("OnceLock", &["std::sync::OnceLock"]),
    ("AtomicBool", &["std::sync::atomic::AtomicBool"]),
    ("AtomicI32", &["std::sync::atomic::AtomicI32"]),
    ("AtomicI64", &["std::sync::atomic::AtomicI64"]),
    ("AtomicU32", &["std::sync::atomic::AtomicU32"]),
    ("AtomicU64", &["std::sync::atomic::AtomicU64"]),
    ("AtomicUsize", &["std::sync::atomic::AtomicUsize"]),
    ("Ordering", &["std::cmp::Ordering", "std::sync::atomic::Ordering"]),
    ("channel", &["std::sync::mpsc::channel"]),
    ("sync_channel", &["std::sync::mpsc::sync_channel"]),
    ("Sender", &["std::sync::mpsc::Sender"]),
    ("SyncSender", &["std::sync::mpsc::SyncSender"]),
    ("Receiver", &["std::sync::mpsc::Receiver"]),
    // threads and time
    ("spawn", &["std::thread::spawn"]),
    ("sleep", &["std::thread::sleep"]),
    ("JoinHandle", &["std::thread::JoinHandle"]),
    ("Duration", &["std::time::Duration"]),
    ("Instant", &["std::time::Instant"]),
    ("SystemTime", &["std::time::SystemTime"]),
    ("UNIX_EPOCH", &["std::time::UNIX_EPOCH"]),
    // io and filesystem
    ("File", &["std::fs::File"]),
    ("OpenOptions", &["std::fs::OpenOptions"]),
    ("read_dir", &["std::fs::read_dir"]),
    ("create_dir_all", &["std::fs::create_dir_all"]),
    ("remove_file", &["std::fs::remove_file"]),
    ("read_to_string", &["std::fs::read_to_string", "std::io::read_to_string"]),
    ("Path", &["std::path::Path"]),
    ("PathBuf", &["std::path::PathBuf"]),
    ("Read", &["std::io::Read"]),
    ("Write", &["std::fmt::Write", "std::io::Write"]),
    ("BufRead", &["std::io::BufRead"]),
    ("BufReader", &["std::io::BufReader"]),
    ("BufWriter", &["std::io::BufWriter"]),
    ("Seek", &["std::io::Seek"]),
    ("SeekFrom", &["std::io::SeekFrom"]),
    ("Cursor", &["std::io::Cursor"]),
    ("ErrorKind", &["std::io::ErrorKind"]),
    ("stdin", &["std::io::stdin"]),
    ("stdout", &["std::io::stdout"]),
    ("stderr", &["std::io::stderr"]),
    ("repeat", &["std::io::repeat", "std::iter::repeat"]),
    ("empty", &["std::io::empty", "std::iter::empty"]),
    // errors and formatting
    ("Error", &["std::error::Error", "std::fmt::Error", "std::io::Error"]),
    ("Display", &["std::fmt::Display"]),
    ("Debug", &["std::fmt::Debug"]),
    ("Formatter", &["std::fmt::Formatter"]),
    ("FromStr", &["std::str::FromStr"]),
    ("from_utf8", &["std::str::from_utf8"]),
    ("Utf8Error", &["std::str::Utf8Error"]),
    ("FromUtf8Error", &["std::string::FromUtf8Error"]),
    ("ParseIntError", &["std::num::ParseIntError"]),
    ("ParseFloatError", &["std::num::ParseFloatError"]),
    ("Infallible", &["std::convert::Infallible"]),
    // process and environment
    ("Command", &["std::process::Command"]),
    ("Stdio", &["std::process::Stdio"]),
    ("ExitCode", &["std::process::ExitCode"]),
    ("exit", &["std::process::exit"]),
    ("args", &["std::env::args"]),
    ("var", &["std::env::var"]),
    ("vars", &["std::env::vars"]),
    ("current_dir", &["std::env::current_dir"]),
    // networking
    ("TcpListener", &["std::net::TcpListener"]),
    ("TcpStream", &["std::net::TcpStream"]),
    ("UdpSocket", &["std::net::UdpSocket"]),
    ("IpAddr", &["std::net::IpAddr"]),
    ("Ipv4Addr", &["std::net::Ipv4Addr"]),
    ("Ipv6Addr", &["std::net::Ipv6Addr"]),
    ("SocketAddr", &["std::net::SocketAddr"]),
    // ops, cmp and hashing
    ("Add", &["std::ops::Add"]),
    ("Sub", &["std::ops::Sub"]),
    ("Mul", &["std::ops::Mul"]),
    ("Div", &["std::ops::Div"]),
    ("Rem", &["std::ops::Rem"]),
    ("Neg", &["std::ops::Neg"]),
    ("Not", &["std::ops::Not"]),
    ("AddAssign", &["std::ops::AddAssign"]),
    ("Index", &["std::ops::Index"]),
    ("IndexMut", &["std::ops::IndexMut"]),
    ("Deref", &["std::ops::Deref"]),
    ("DerefMut", &["std::ops::DerefMut"]),
    ("Range", &["std::ops::Range"]),
    ("RangeInclusive", &["std::ops::RangeInclusive"]),
    ("max", &["std::cmp::max"]),
    ("min", &["std::cmp::min"]),
    ("Hash", &["std::hash::Hash"]),
    ("Hasher", &["std::hash::Hasher"]),
    // memory
    ("swap", &["std::mem::swap"]),
    ("replace", &["std::mem::replace"]),
    ("take", &["std::mem::take"]),
    ("size_of", &["std::mem::size_of"]),
    ("transmute", &["std::mem::transmute"]),
    ("black_box", &["std::hint::black_box"]),
    // iterators
    ("once", &["std::iter::once"]),
    ("from_fn", &["std::iter::from_fn"]),
    ("successors", &["std::iter::successors"]),
    ("zip", &["std::iter::zip"]),
    ("Peekable", &["std::iter::Peekable"]),
    // misc
    ("Any", &["std::any::Any"]),
    ("TypeId", &["std::any::TypeId"]),
    ("type_name", &["std::any::type_name"]),
    ("CString", &["std::ffi::CString"]),
    ("CStr", &["std::ffi::CStr"]),
    ("OsString", &["std::ffi::OsString"]),
    ("OsStr", &["std::ffi::OsStr"]),
    ("Wrapping", &["std::num::Wrapping"]),
    ("NonZeroU32", &["std::num::NonZeroU32"]),
    ("NonZeroUsize", &["std::num::NonZeroUsize"]),
    ("catch_unwind", &["std::panic::catch_unwind"]),
    ("Future", &["std::future::Future"]),
    ("Poll", &["std::task::Poll"]),
    ("PI", &["std::f32::consts::PI", "std::f64::consts::PI"]),
    ("E", &["std::f32::consts::E", "std::f64::consts::E"]),
];
