use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use tokio::fs;
use tracing::{info, warn};

// rust 的 async trait 还没有稳定，可以用async_trait 宏
#[async_trait]
pub trait Fetch {
    type Error;
    async fn fetch(&self) -> Result<String, Self::Error>;
}

/// 从文件源或者 http 源中获取原始文本
pub async fn retrieve_data(source: impl AsRef<str>, timeout: Duration) -> Result<String> {
    let name = source.as_ref();
    if name.starts_with("http://") || name.starts_with("https://") {
        UrlFetcher { url: name, timeout }.fetch().await
    } else if let Some(path) = name.strip_prefix("file://") {
        FileFetcher(path).fetch().await
    } else if name.contains("://") {
        Err(anyhow!("We only support http/https/file at the moment: {}", name))
    } else {
        // 没有 scheme 就当作本地路径
        FileFetcher(name).fetch().await
    }
}

/// 先取远程数据，失败时记一条警告然后读本地副本；两个都失败才报错
pub async fn retrieve_with_fallback(
    remote: Option<&str>,
    local: &str,
    timeout: Duration,
) -> Result<String> {
    if let Some(url) = remote {
        match retrieve_data(url, timeout).await {
            Ok(text) => {
                info!("retrieved {} bytes from {}", text.len(), url);
                return Ok(text);
            }
            Err(e) => warn!("failed to retrieve {}: {:#}, falling back to {}", url, e, local),
        }
    }

    let text = retrieve_data(local, timeout)
        .await
        .with_context(|| format!("no usable data source, local fallback {} failed", local))?;
    info!("retrieved {} bytes from {}", text.len(), local);
    Ok(text)
}

struct UrlFetcher<'a> {
    url: &'a str,
    timeout: Duration,
}

#[async_trait]
impl<'a> Fetch for UrlFetcher<'a> {
    type Error = anyhow::Error;

    async fn fetch(&self) -> Result<String, Self::Error> {
        let client = reqwest::Client::builder().timeout(self.timeout).build()?;
        Ok(client
            .get(self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?)
    }
}

struct FileFetcher<'a>(pub(crate) &'a str);

#[async_trait]
impl<'a> Fetch for FileFetcher<'a> {
    type Error = anyhow::Error;

    async fn fetch(&self) -> Result<String, Self::Error> {
        Ok(fs::read_to_string(self.0)
            .await
            .with_context(|| format!("reading {}", self.0))?)
    }
}
