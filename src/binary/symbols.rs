// src/binary/symbols.rs

//! Exported symbol extraction
//!
//! Filters the global dynamic symbols of an executable down to the ones worth
//! cataloguing: identifier-like names that are not part of the C runtime,
//! libc or the loader.

use std::collections::HashSet;
use std::sync::LazyLock;

/// C++ runtime internals (`__cxa_atexit`, `__cxa_finalize`, ...)
const CXX_RUNTIME_PREFIX: &str = "__cxa";

/// Names present in nearly every binary that say nothing about the package
const EXCLUDED_SYMBOLS: &[&str] = &[
    "abort",
    "__assert_fail",
    "bindtextdomain",
    "__bss_start",
    "calloc",
    "chmod",
    "close",
    "close_stdout",
    "__data_start",
    "dcgettext",
    "dirname",
    "_edata",
    "_end",
    "error",
    "_exit",
    "exit",
    "fclose",
    "fdopen",
    "ferror",
    "fflush",
    "fgets",
    "_fini",
    "fnmatch",
    "fopen",
    "fork",
    "fprintf",
    "__fprintf_chk",
    "fputc",
    "fputs",
    "fread",
    "free",
    "fscanf",
    "fwrite",
    "getenv",
    "getgrgid",
    "getgrnam",
    "getopt",
    "getopt_long",
    "getpwnam",
    "getpwuid",
    "gettimeofday",
    "__gmon_start__",
    "_init",
    "ioctl",
    "_IO_stdin_used",
    "isatty",
    "iswalnum",
    "iswprint",
    "iswspace",
    "_Jv_RegisterClasses",
    "kill",
    "__libc_csu_fini",
    "__libc_csu_init",
    "__libc_start_main",
    "localtime",
    "malloc",
    "memchr",
    "memcpy",
    "__memcpy_chk",
    "memmove",
    "mempcpy",
    "__mempcpy_chk",
    "memset",
    "mkstemp",
    "mktime",
    "opendir",
    "optarg",
    "optind",
    "pclose",
    "pipe",
    "popen",
    "printf",
    "__printf_chk",
    "__progname",
    "__progname_full",
    "program_invocation_name",
    "program_invocation_short_name",
    "program_name",
    "putchar",
    "puts",
    "read",
    "readdir",
    "readlink",
    "realloc",
    "rename",
    "setenv",
    "setlocale",
    "sigaction",
    "sigaddset",
    "sigemptyset",
    "sigismember",
    "signal",
    "sigprocmask",
    "snprintf",
    "__snprintf_chk",
    "sprintf",
    "__sprintf_chk",
    "__stack_chk_fail",
    "stderr",
    "stdin",
    "stdout",
    "stpcpy",
    "strcasecmp",
    "strchr",
    "strcmp",
    "strcpy",
    "strdup",
    "strerror",
    "strftime",
    "strlen",
    "strncasecmp",
    "strncmp",
    "strnlen",
    "strrchr",
    "strstr",
    "strtol",
    "textdomain",
    "time",
    "umask",
    "unlink",
    "Version",
    "version_etc_copyright",
    "waitpid",
    "write",
    "__xstat",
];

static EXCLUDED: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| EXCLUDED_SYMBOLS.iter().copied().collect());

/// Whether a name looks like an identifier: at least two leading
/// ASCII letters or underscores
fn is_identifier_like(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() >= 2
        && bytes[..2]
            .iter()
            .all(|b| b.is_ascii_alphabetic() || *b == b'_')
}

/// Whether a single symbol survives the filter
pub fn is_cataloguable(name: &str) -> bool {
    is_identifier_like(name)
        && !EXCLUDED.contains(name)
        && !name.starts_with(CXX_RUNTIME_PREFIX)
}

/// Filter a raw global dynamic symbol list, keeping order and duplicates
pub fn extract_symbols<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    raw.iter()
        .map(AsRef::as_ref)
        .filter(|name| is_cataloguable(name))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_libc_names_are_dropped() {
        let raw = ["malloc", "printf", "my_custom_fn"];
        assert_eq!(extract_symbols(&raw), vec!["my_custom_fn".to_string()]);
    }

    #[test]
    fn test_identifier_shape() {
        assert!(is_cataloguable("_Z3foov"));
        assert!(is_cataloguable("ab"));
        assert!(!is_cataloguable("a"));
        assert!(!is_cataloguable("a1b2"));
        assert!(!is_cataloguable("9lives"));
        assert!(!is_cataloguable(".hidden"));
        assert!(!is_cataloguable(""));
    }

    #[test]
    fn test_cxx_runtime_prefix() {
        let raw = ["__cxa_atexit", "__cxa_finalize", "__cx_ok"];
        assert_eq!(extract_symbols(&raw), vec!["__cx_ok".to_string()]);
    }

    #[test]
    fn test_order_and_duplicates_kept() {
        let raw = vec![
            "zlib_init".to_string(),
            "__libc_start_main".to_string(),
            "acme_run".to_string(),
            "zlib_init".to_string(),
        ];
        assert_eq!(
            extract_symbols(&raw),
            vec![
                "zlib_init".to_string(),
                "acme_run".to_string(),
                "zlib_init".to_string()
            ]
        );
    }

    #[test]
    fn test_exclusion_set_size() {
        assert!(EXCLUDED.len() >= 120);
        assert_eq!(EXCLUDED.len(), EXCLUDED_SYMBOLS.len());
    }
}
