//! Tracing 初始化

use anyhow::{Context, Result};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

/// 日志格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON 结构化日志 (含线程、源码位置)
    #[default]
    Json,
    /// 多行人类可读格式
    Pretty,
    /// 单行格式
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => anyhow::bail!("unknown log format '{}'", other),
        }
    }
}

/// 安装全局 subscriber
///
/// 日志写入 stderr，stdout 留给状态板、摘要与 JSON 输出。
/// `RUST_LOG` 优先于 `default_level`。重复安装返回错误。
pub fn init_tracing(format: LogFormat, default_level: &str) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt_layer(format, std::io::stderr))
        .with(filter)
        .try_init()
        .context("Failed to initialize tracing subscriber")
}

/// 按格式构建输出层
fn fmt_layer<W>(format: LogFormat, writer: W) -> Box<dyn Layer<Registry> + Send + Sync>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(writer)
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Pretty => fmt::layer().pretty().with_writer(writer).boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_writer(writer)
            .with_target(false)
            .boxed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    /// In-memory writer standing in for stderr
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_every_format_writes_to_the_given_writer() {
        for format in [LogFormat::Json, LogFormat::Pretty, LogFormat::Compact] {
            let captured = Captured::default();
            let writer = captured.clone();
            let subscriber =
                tracing_subscriber::registry().with(fmt_layer(format, move || writer.clone()));

            tracing::subscriber::with_default(subscriber, || {
                tracing::info!(tick = 3, "board refreshed");
            });

            let out = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
            assert!(out.contains("board refreshed"), "{format:?}: {out}");
        }
    }

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
