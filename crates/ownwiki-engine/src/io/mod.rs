use crate::models::Article;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Subdirectory receiving soft-deleted articles and superseded revisions.
const REMOVED_DIR: &str = "removed";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Article not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid wiki directory: {0}")]
    InvalidWikiDir(String),
}

/// Outcome of the pre-save validation in [`check_save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveCheck {
    /// Article names cannot be blank.
    BlankName,
    /// An article with the same name already exists (case-insensitive).
    DuplicateName,
    /// Saving blank content is allowed but worth confirming with the user.
    BlankContent,
    Ok,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    Create,
    Edit,
}

/// Absolute path of an article's live file.
pub fn article_path(article: &Article, wiki_root: &Path) -> PathBuf {
    article.relative_path().to_path(wiki_root)
}

/// Read an article's raw content.
pub fn read(article: &Article, wiki_root: &Path) -> Result<String, StoreError> {
    let path = article_path(article, wiki_root);
    if !path.exists() {
        return Err(StoreError::NotFound(path));
    }
    fs::read_to_string(&path).map_err(StoreError::Io)
}

/// Write an article's content, creating or overwriting the file.
pub fn create(article: &Article, wiki_root: &Path, content: &str) -> Result<(), StoreError> {
    let path = article_path(article, wiki_root);
    fs::write(&path, content).map_err(StoreError::Io)
}

/// Soft delete: the article file moves into `removed/` under a unique name,
/// so a deletion stays recoverable outside the application.
pub fn remove(article: &Article, wiki_root: &Path) -> Result<(), StoreError> {
    let path = article_path(article, wiki_root);
    if !path.exists() {
        return Err(StoreError::NotFound(path));
    }
    let dst = removed_path(article, wiki_root)?;
    fs::rename(&path, &dst).map_err(StoreError::Io)
}

/// Archive `content` as a superseded revision without touching the live
/// file. Used when an external editor has already rewritten the article in
/// place and only the previous content needs preserving.
pub fn archive_revision(
    article: &Article,
    wiki_root: &Path,
    content: &str,
) -> Result<(), StoreError> {
    let dst = removed_path(article, wiki_root)?;
    fs::write(&dst, content).map_err(StoreError::Io)
}

/// Replace an article's content. The previous revision is moved into
/// `removed/` first, so every update leaves a recoverable copy behind.
pub fn update(article: &Article, wiki_root: &Path, content: &str) -> Result<(), StoreError> {
    remove(article, wiki_root)?;
    create(article, wiki_root, content)
}

fn removed_path(article: &Article, wiki_root: &Path) -> Result<PathBuf, StoreError> {
    let dir = wiki_root.join(REMOVED_DIR);
    fs::create_dir_all(&dir).map_err(StoreError::Io)?;
    Ok(dir.join(format!("{}-{}.md", article.name(), Uuid::new_v4())))
}

/// List the articles in the wiki root, sorted by name.
///
/// Only flat `*.md` files directly under the root count; `removed/` and any
/// other subdirectory are not scanned.
pub fn list_articles(wiki_root: &Path) -> Result<Vec<Article>, StoreError> {
    validate_wiki_dir(wiki_root)?;

    let mut articles = Vec::new();
    for entry in fs::read_dir(wiki_root).map_err(StoreError::Io)? {
        let entry = entry.map_err(StoreError::Io)?;
        let path = entry.path();
        if path.is_dir() {
            continue;
        }
        if let Some(ext) = path.extension()
            && ext == "md"
            && let Some(name) = path.file_name()
        {
            articles.push(Article::from_file_name(&name.to_string_lossy()));
        }
    }
    articles.sort_by(|a, b| a.name().cmp(b.name()));
    Ok(articles)
}

pub fn validate_wiki_dir(path: &Path) -> Result<(), StoreError> {
    if !path.exists() || !path.is_dir() {
        return Err(StoreError::InvalidWikiDir(
            "directory does not exist".to_string(),
        ));
    }
    Ok(())
}

/// Pre-save validation: blank names are rejected, creating over an existing
/// name (case-insensitive) needs confirmation, and so does blank content.
pub fn check_save(
    wiki_root: &Path,
    name: &str,
    content: &str,
    mode: SaveMode,
) -> Result<SaveCheck, StoreError> {
    if name.trim().is_empty() {
        return Ok(SaveCheck::BlankName);
    }
    if mode == SaveMode::Create {
        let existing = list_articles(wiki_root)?;
        if existing
            .iter()
            .any(|a| a.name().eq_ignore_ascii_case(name))
        {
            return Ok(SaveCheck::DuplicateName);
        }
    }
    if content.trim().is_empty() {
        return Ok(SaveCheck::BlankContent);
    }
    Ok(SaveCheck::Ok)
}
