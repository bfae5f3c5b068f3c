//! Global-symbol oracle consumed by the reference qualifier.
//!
//! The minifier never decides on its own whether a bare name is a global
//! function or constant; it asks a [`SymbolOracle`]. An oracle that cannot
//! answer simply says "no", which leaves the name unqualified.

use crate::error::{MinifyError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Answers whether a bare name resolves to a known global symbol.
pub trait SymbolOracle: Send + Sync {
    /// Constants are case-sensitive.
    fn is_constant(&self, name: &str) -> bool;
    /// Function names are case-insensitive.
    fn is_function(&self, name: &str) -> bool;
}

/// Oracle for when no symbol information is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSymbols;

impl SymbolOracle for NoSymbols {
    fn is_constant(&self, _name: &str) -> bool {
        false
    }

    fn is_function(&self, _name: &str) -> bool {
        false
    }
}

const BUILTIN_CONSTANTS: &[&str] = &[
    "PHP_EOL", "PHP_INT_MAX", "PHP_INT_MIN", "PHP_INT_SIZE", "PHP_FLOAT_EPSILON",
    "PHP_FLOAT_MAX", "PHP_FLOAT_MIN", "PHP_FLOAT_DIG", "PHP_VERSION", "PHP_MAJOR_VERSION",
    "PHP_MINOR_VERSION", "PHP_OS", "PHP_OS_FAMILY", "PHP_BINARY", "DIRECTORY_SEPARATOR",
    "PATH_SEPARATOR", "E_ALL", "E_ERROR", "E_WARNING", "E_NOTICE", "E_STRICT",
    "E_DEPRECATED", "E_USER_ERROR", "E_USER_WARNING", "E_USER_NOTICE", "E_USER_DEPRECATED",
    "M_PI", "M_E", "M_SQRT2", "INF", "NAN", "SORT_REGULAR", "SORT_NUMERIC", "SORT_STRING",
    "SORT_FLAG_CASE", "COUNT_RECURSIVE", "ARRAY_FILTER_USE_KEY", "ARRAY_FILTER_USE_BOTH",
    "JSON_PRETTY_PRINT", "JSON_UNESCAPED_SLASHES", "JSON_UNESCAPED_UNICODE",
    "JSON_THROW_ON_ERROR", "JSON_ERROR_NONE", "PREG_SPLIT_NO_EMPTY", "PREG_SPLIT_DELIM_CAPTURE",
    "PREG_PATTERN_ORDER", "PREG_SET_ORDER", "FILE_APPEND", "FILE_IGNORE_NEW_LINES",
    "FILE_SKIP_EMPTY_LINES", "LOCK_EX", "LOCK_SH", "LOCK_UN", "SEEK_SET", "SEEK_CUR",
    "SEEK_END", "STR_PAD_LEFT", "STR_PAD_RIGHT", "STR_PAD_BOTH", "ENT_QUOTES",
    "PHP_ROUND_HALF_UP", "PHP_ROUND_HALF_DOWN", "MT_RAND_MT19937",
];

const BUILTIN_FUNCTIONS: &[&str] = &[
    "strlen", "count", "sizeof", "is_array", "is_string", "is_int", "is_integer", "is_float",
    "is_bool", "is_null", "is_numeric", "is_object", "is_callable", "is_resource", "is_scalar",
    "is_iterable", "in_array", "array_key_exists", "array_keys", "array_values", "array_map",
    "array_filter", "array_merge", "array_slice", "array_splice", "array_search",
    "array_shift", "array_unshift", "array_push", "array_pop", "array_combine", "array_flip",
    "array_unique", "array_reverse", "array_sum", "array_fill", "array_diff", "array_intersect",
    "array_key_first", "array_key_last", "array_walk", "array_chunk", "array_column",
    "implode", "explode", "join", "str_replace", "str_repeat", "str_pad", "str_split",
    "str_contains", "str_starts_with", "str_ends_with", "substr", "substr_count", "strpos",
    "stripos", "strrpos", "strtolower", "strtoupper", "strcmp", "strcasecmp", "ucfirst",
    "lcfirst", "ucwords", "trim", "rtrim", "ltrim", "sprintf", "printf", "vsprintf",
    "number_format", "nl2br", "htmlspecialchars", "ord", "chr", "json_encode", "json_decode",
    "serialize", "unserialize", "var_export", "var_dump", "print_r", "intval", "floatval",
    "strval", "boolval", "settype", "gettype", "get_class", "get_parent_class",
    "get_object_vars", "method_exists", "property_exists", "class_exists",
    "interface_exists", "function_exists", "defined", "constant", "define",
    "call_user_func", "call_user_func_array", "func_get_args", "func_num_args",
    "spl_object_hash", "spl_object_id", "spl_autoload_register", "iterator_to_array",
    "sort", "rsort", "ksort", "krsort", "asort", "arsort", "usort", "uasort", "uksort",
    "shuffle", "range", "compact", "extract", "max", "min", "abs", "floor", "ceil", "round",
    "sqrt", "pow", "intdiv", "fmod", "mt_rand", "mt_srand", "rand", "random_int",
    "random_bytes", "microtime", "hrtime", "time", "date", "mktime", "strtotime", "sleep",
    "usleep", "file_exists", "file_get_contents", "file_put_contents", "fopen", "fclose",
    "fwrite", "fread", "fgets", "feof", "is_file", "is_dir", "mkdir", "rmdir", "unlink",
    "rename", "copy", "scandir", "glob", "dirname", "basename", "pathinfo", "realpath",
    "preg_match", "preg_match_all", "preg_replace", "preg_replace_callback", "preg_split",
    "preg_quote", "md5", "sha1", "crc32", "hash", "base64_encode", "base64_decode",
    "bin2hex", "hex2bin", "dechex", "hexdec", "mb_strlen", "mb_substr", "mb_strtolower",
    "mb_strtoupper", "trigger_error", "error_reporting", "ini_set", "ini_get",
    "extension_loaded", "assert", "spl_autoload_unregister",
];

#[derive(Debug, Default, Deserialize, Serialize)]
struct SymbolFile {
    #[serde(default)]
    constants: Vec<String>,
    #[serde(default)]
    functions: Vec<String>,
}

/// Table-backed oracle.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    constants: HashSet<String>,
    /// Stored lowercased.
    functions: HashSet<String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Common core functions and constants shipped with every PHP build.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        for name in BUILTIN_CONSTANTS {
            table.constants.insert((*name).to_string());
        }
        for name in BUILTIN_FUNCTIONS {
            table.functions.insert((*name).to_string());
        }
        table
    }

    /// Parse `{"constants": [...], "functions": [...]}`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: SymbolFile = serde_json::from_str(json)?;
        let mut table = Self::new();
        for name in file.constants {
            table.add_constant(&name)?;
        }
        for name in file.functions {
            table.add_function(&name)?;
        }
        Ok(table)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| MinifyError::io(path, e))?;
        let table = Self::from_json_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            constants = table.constant_count(),
            functions = table.function_count(),
            "loaded symbol table"
        );
        Ok(table)
    }

    pub fn add_constant(&mut self, name: &str) -> Result<()> {
        let name = validate(name)?;
        self.constants.insert(name.to_string());
        Ok(())
    }

    pub fn add_function(&mut self, name: &str) -> Result<()> {
        let name = validate(name)?;
        self.functions.insert(name.to_ascii_lowercase());
        Ok(())
    }

    /// Merge another table into this one.
    pub fn extend(&mut self, other: SymbolTable) {
        self.constants.extend(other.constants);
        self.functions.extend(other.functions);
    }

    pub fn constant_count(&self) -> usize {
        self.constants.len()
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }
}

/// Accepts `name` or `\name`; rejects anything that is not a plain identifier.
fn validate(name: &str) -> Result<&str> {
    let name = name.strip_prefix('\\').unwrap_or(name);
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() || !c.is_ascii() => {
            chars.all(|c| c == '_' || c.is_ascii_alphanumeric() || !c.is_ascii())
        }
        _ => false,
    };
    if valid {
        Ok(name)
    } else {
        Err(MinifyError::InvalidSymbols(format!("not a global identifier: {name:?}")))
    }
}

impl SymbolOracle for SymbolTable {
    fn is_constant(&self, name: &str) -> bool {
        self.constants.contains(name)
    }

    fn is_function(&self, name: &str) -> bool {
        self.functions.contains(&name.to_ascii_lowercase())
    }
}
