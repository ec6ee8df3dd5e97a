//! Classifies repository paths as text or binary from their name alone.
//!
//! The engine never sees file contents, so detection relies on known extension
//! lists first and falls back to the MIME type guessed from the extension.

use mime_guess::mime;

const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "markdown", "rst", "adoc", "rs", "py", "js", "ts", "jsx", "tsx", "java", "c",
    "cpp", "cxx", "cc", "h", "hpp", "hxx", "go", "rb", "php", "swift", "kt", "kts", "scala",
    "clj", "hs", "ml", "fs", "html", "htm", "xml", "css", "scss", "sass", "less", "svg", "vue",
    "svelte", "json", "jsonl", "yaml", "yml", "toml", "ini", "cfg", "conf", "properties", "sql",
    "sh", "bash", "zsh", "fish", "ps1", "bat", "cmd", "tex", "r", "lua", "dart", "elm", "ex",
    "exs", "erl", "nim", "zig", "graphql", "gql", "prisma", "proto", "csv", "tsv", "mjs", "cjs",
    "lock", "env", "gitignore", "gitattributes", "editorconfig", "dockerfile", "makefile",
    "cmake", "gradle", "nix", "ipynb", "pyi",
];

const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "ico", "webp", "tiff", "tif", "raw", "cr2", "nef", "dng",
    "heic", "heif", "avif", "icns",
];

const BINARY_EXTENSIONS: &[&str] = &[
    "exe", "dll", "so", "dylib", "app", "deb", "rpm", "msi", "zip", "tar", "gz", "bz2", "xz",
    "7z", "rar", "jar", "war", "mp3", "mp4", "avi", "mkv", "mov", "wmv", "flv", "webm", "wav",
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "bin", "dat", "db", "sqlite", "sqlite3",
    "rlib", "rmeta", "pdb", "lib", "a", "obj", "o", "class", "pyc", "pyo", "wasm", "ttf", "otf",
    "woff", "woff2", "crate", "gem", "whl", "egg",
];

fn extension(path: &str) -> Option<String> {
    let name = path.rsplit('/').next().unwrap_or(path);
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() && !TEXT_EXTENSIONS.contains(&ext.to_lowercase().as_str()) {
        // Dotfiles such as `.bashrc` have no extension.
        return None;
    }
    Some(ext.to_lowercase())
}

/// Returns `true` if the path most likely names a binary file.
///
/// Unknown extensions and extensionless files are assumed to be text.
pub fn is_probably_binary(path: &str) -> bool {
    let Some(ext) = extension(path) else {
        return false;
    };

    if TEXT_EXTENSIONS.contains(&ext.as_str()) {
        return false;
    }
    if BINARY_EXTENSIONS.contains(&ext.as_str()) || IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        return true;
    }

    match mime_guess::from_ext(&ext).first() {
        Some(guess) => is_binary_mime(&guess),
        None => false,
    }
}

/// Returns `true` if the path names an image (used for row icons).
pub fn is_image_file(path: &str) -> bool {
    extension(path).is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()) || ext == "svg")
}

fn is_binary_mime(guess: &mime::Mime) -> bool {
    match guess.type_().as_str() {
        "text" => false,
        "image" | "audio" | "video" | "font" => true,
        "application" => {
            let textual = ["json", "javascript", "xml", "toml", "yaml", "x-sh"];
            let subtype = guess.subtype();
            let suffix = guess.suffix();
            let suffix = suffix.as_ref().map(|s| s.as_str());
            !(textual.contains(&subtype.as_str()) || matches!(suffix, Some("json") | Some("xml")))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions() {
        assert!(!is_probably_binary("src/main.rs"));
        assert!(!is_probably_binary("assets/logo.svg"));
        assert!(is_probably_binary("assets/logo.PNG"));
        assert!(is_probably_binary("dist/app.wasm"));
        assert!(is_probably_binary("vendor/archive.tar.gz"));
    }

    #[test]
    fn test_extensionless_and_dotfiles_are_text() {
        assert!(!is_probably_binary("Makefile"));
        assert!(!is_probably_binary("LICENSE"));
        assert!(!is_probably_binary(".bashrc"));
        assert!(!is_probably_binary(".env"));
    }

    #[test]
    fn test_mime_fallback() {
        // Neither list knows these; the guessed MIME type decides.
        assert!(is_probably_binary("media/clip.ogg"));
        assert!(!is_probably_binary("docs/page.xhtml"));
    }

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file("a/b/photo.jpeg"));
        assert!(is_image_file("icon.svg"));
        assert!(!is_image_file("notes.md"));
    }
}
