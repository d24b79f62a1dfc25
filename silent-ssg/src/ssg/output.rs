use std::path::{Component, Path, PathBuf};

use crate::{SsgError, SsgResult};

/// 将 URL 映射为输出目录下的相对路径（以 `/` 开头）
///
/// - 以 `/` 结尾：追加 `index.html`
/// - HTML 响应且不以 `.html`/`.htm` 结尾：追加 `.html`
/// - 其它：保持不变
///
/// 查询串与片段会被忽略。
pub fn resolve_path(url: &str, is_html: bool) -> String {
    let url = url
        .split_once(['?', '#'])
        .map_or(url, |(path, _)| path);
    if url.ends_with('/') {
        format!("{url}index.html")
    } else if is_html && !(url.ends_with(".html") || url.ends_with(".htm")) {
        format!("{url}.html")
    } else {
        url.to_string()
    }
}

/// 是否为 HTML 内容类型
pub fn is_html_content_type(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.starts_with("text/html"))
}

/// 计算输出文件的绝对位置，拒绝越出输出目录的路径
pub fn output_file(out_dir: &Path, path: &str) -> SsgResult<PathBuf> {
    let decoded = urlencoding::decode(path)
        .map_err(|e| SsgError::config_error(format!("invalid output path `{path}`: {e}")))?;
    let relative = Path::new(decoded.trim_start_matches('/'));
    let mut file = out_dir.to_path_buf();
    for component in relative.components() {
        match component {
            Component::Normal(part) => file.push(part),
            Component::CurDir => {}
            _ => {
                return Err(SsgError::config_error(format!(
                    "output path `{path}` escapes the output directory"
                )));
            }
        }
    }
    if file == out_dir {
        return Err(SsgError::config_error(format!(
            "output path `{path}` does not name a file"
        )));
    }
    Ok(file)
}
