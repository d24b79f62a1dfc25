use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::{debug, info};
use walkdir::WalkDir;

use super::output::output_file;
use crate::{SsgError, SsgResult};

/// 静态资源忽略规则（glob），匹配相对路径或文件名
#[derive(Debug, Clone)]
pub struct IgnorePatterns {
    patterns: Vec<String>,
    set: GlobSet,
}

impl Default for IgnorePatterns {
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            set: GlobSet::empty(),
        }
    }
}

impl IgnorePatterns {
    pub fn new<I, S>(patterns: I) -> SsgResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        let mut builder = GlobSetBuilder::new();
        for pattern in &patterns {
            builder.add(Glob::new(pattern)?);
        }
        Ok(Self {
            set: builder.build()?,
            patterns,
        })
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_ignored(&self, relative: &Path) -> bool {
        self.set.is_match(relative)
            || relative
                .file_name()
                .is_some_and(|name| self.set.is_match(Path::new(name)))
    }
}

/// 将静态资源收集到输出目录
#[async_trait]
pub trait AssetCollector: Send + Sync {
    /// 在写入任何文件前校验配置
    fn validate(&self) -> SsgResult<()> {
        Ok(())
    }

    /// 复制资源，返回写入的文件
    async fn collect(&self, out_dir: &Path, ignore: &IgnorePatterns) -> SsgResult<Vec<PathBuf>>;
}

/// 从若干源目录收集静态文件，复制到 `url_prefix` 对应的输出子目录
///
/// 多个源目录中存在相同相对路径时，以先声明的目录为准。
#[derive(Debug, Clone, Default)]
pub struct StaticFiles {
    url_prefix: String,
    dirs: Vec<PathBuf>,
}

impl StaticFiles {
    pub fn new(url_prefix: &str) -> Self {
        Self {
            url_prefix: url_prefix.to_string(),
            dirs: Vec::new(),
        }
    }

    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dirs.push(dir.into());
        self
    }

    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// 输出目录下的目标子目录，前缀为空时返回 None
    fn target_dir(&self, out_dir: &Path) -> SsgResult<Option<PathBuf>> {
        if self.url_prefix.is_empty() {
            return Ok(None);
        }
        let path = match url::Url::parse(&self.url_prefix) {
            Ok(url) if url.has_host() => url.path().to_string(),
            _ => self.url_prefix.clone(),
        };
        let relative = path.trim_matches('/');
        if relative.is_empty() {
            Ok(Some(out_dir.to_path_buf()))
        } else {
            output_file(out_dir, relative).map(Some)
        }
    }
}

#[async_trait]
impl AssetCollector for StaticFiles {
    fn validate(&self) -> SsgResult<()> {
        self.target_dir(Path::new("."))?;
        for dir in &self.dirs {
            if !dir.is_dir() {
                return Err(SsgError::config_error(format!(
                    "static directory `{}` does not exist",
                    dir.display()
                )));
            }
        }
        Ok(())
    }

    async fn collect(&self, out_dir: &Path, ignore: &IgnorePatterns) -> SsgResult<Vec<PathBuf>> {
        let Some(target) = self.target_dir(out_dir)? else {
            debug!("static url prefix is empty, skip assets");
            return Ok(Vec::new());
        };
        let mut seen = HashSet::new();
        let mut written = Vec::new();
        for dir in &self.dirs {
            let files = WalkDir::new(dir)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| {
                    let relative = e.path().strip_prefix(dir).unwrap_or(e.path());
                    relative.as_os_str().is_empty() || !ignore.is_ignored(relative)
                })
                .filter(|e| e.as_ref().map_or(true, |e| e.file_type().is_file()))
                .collect::<Result<Vec<_>, _>>()?;
            for entry in files {
                let relative = entry
                    .path()
                    .strip_prefix(dir)
                    .map_err(|e| SsgError::config_error(e.to_string()))?
                    .to_path_buf();
                if !seen.insert(relative.clone()) {
                    debug!(file = %entry.path().display(), "shadowed by an earlier static dir");
                    continue;
                }
                let dest = target.join(&relative);
                if let Some(parent) = dest.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::copy(entry.path(), &dest).await?;
                info!(asset = %dest.display(), "copied");
                written.push(dest);
            }
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    // ==================== 忽略规则测试 ====================

    #[test]
    fn test_ignore_patterns() {
        let ignore = IgnorePatterns::new(["*.scss", "drafts"]).unwrap();
        assert!(ignore.is_ignored(Path::new("css/site.scss")));
        assert!(ignore.is_ignored(Path::new("drafts")));
        assert!(!ignore.is_ignored(Path::new("css/site.css")));
        assert!(!IgnorePatterns::default().is_ignored(Path::new("a.txt")));
        assert_eq!(ignore.patterns(), ["*.scss", "drafts"]);
    }

    #[test]
    fn test_invalid_glob() {
        assert!(matches!(
            IgnorePatterns::new(["a[b"]),
            Err(SsgError::GlobError(_))
        ));
    }

    // ==================== 收集测试 ====================

    #[tokio::test]
    async fn test_collect_first_source_wins() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write(first.path(), "css/site.css", "first");
        write(second.path(), "css/site.css", "second");
        write(second.path(), "js/app.js", "app");
        write(second.path(), "css/site.scss", "ignored");
        write(second.path(), "drafts/x.css", "ignored");

        let assets = StaticFiles::new("assets/")
            .with_dir(first.path())
            .with_dir(second.path());
        assets.validate().unwrap();
        let ignore = IgnorePatterns::new(["*.scss", "drafts"]).unwrap();
        let written = assets.collect(out.path(), &ignore).await.unwrap();

        assert_eq!(written.len(), 2);
        let root = out.path().join("assets");
        assert_eq!(fs::read_to_string(root.join("css/site.css")).unwrap(), "first");
        assert_eq!(fs::read_to_string(root.join("js/app.js")).unwrap(), "app");
        assert!(!root.join("css/site.scss").exists());
        assert!(!root.join("drafts").exists());
    }

    #[tokio::test]
    async fn test_absolute_prefix_uses_path_only() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write(src.path(), "logo.svg", "<svg/>");
        let assets = StaticFiles::new("https://cdn.example.com/static/v1/").with_dir(src.path());
        assets
            .collect(out.path(), &IgnorePatterns::default())
            .await
            .unwrap();
        assert!(out.path().join("static/v1/logo.svg").is_file());
    }

    #[tokio::test]
    async fn test_empty_prefix_disables_collection() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write(src.path(), "logo.svg", "<svg/>");
        let written = StaticFiles::new("")
            .with_dir(src.path())
            .collect(out.path(), &IgnorePatterns::default())
            .await
            .unwrap();
        assert!(written.is_empty());
    }

    #[test]
    fn test_validate_missing_dir() {
        let assets = StaticFiles::new("assets/").with_dir("/definitely/not/here");
        assert!(matches!(assets.validate(), Err(SsgError::ConfigError(_))));
    }
}
