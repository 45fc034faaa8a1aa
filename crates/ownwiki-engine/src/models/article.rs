use relative_path::{RelativePath, RelativePathBuf};

/// One wiki article, identified by its display name.
///
/// Articles are stored as flat `<name>.md` files directly under the wiki
/// root; the relative path is always derived from the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    relative_path: RelativePathBuf,
    name: String,
}

impl Article {
    /// Create an article handle from its display name.
    pub fn new(name: &str) -> Self {
        Self {
            relative_path: RelativePathBuf::from(format!("{name}.md")),
            name: name.to_string(),
        }
    }

    /// Create from a stored file name such as `Home.md`.
    pub fn from_file_name(file_name: &str) -> Self {
        let name = file_name.strip_suffix(".md").unwrap_or(file_name);
        Self::new(name)
    }

    /// Path of the article file, relative to the wiki root.
    pub fn relative_path(&self) -> &RelativePath {
        &self.relative_path
    }

    /// Display name, without the `.md` extension.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl From<&str> for Article {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_derives_file_path_from_name() {
        let article = Article::new("Home");
        assert_eq!(article.name(), "Home");
        assert_eq!(article.relative_path().as_str(), "Home.md");
    }

    #[test]
    fn from_file_name_strips_extension() {
        let article = Article::from_file_name("Reading List.md");
        assert_eq!(article.name(), "Reading List");
        assert_eq!(article.relative_path().as_str(), "Reading List.md");
    }

    #[test]
    fn from_file_name_without_extension_is_kept() {
        let article = Article::from_file_name("Notes");
        assert_eq!(article.name(), "Notes");
        assert_eq!(article.relative_path().as_str(), "Notes.md");
    }
}
