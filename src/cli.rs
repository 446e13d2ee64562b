use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use covid_dash::config::{DEFAULT_COORDINATES_FILE, DEFAULT_DATA_FILE, DEFAULT_DATA_URL};
use covid_dash::selection::{parse_date, DEFAULT_DETAIL_COUNTRY, DEFAULT_TOP_N};
use covid_dash::{DashError, Selection, SourceConfig};

/// 命令行版的仪表盘：每个子命令对应一个图表，输出 JSON
#[derive(Debug, Parser)]
#[command(name = "covid-dash", version, about = "COVID-19 dashboard charts as JSON")]
pub struct Cli {
    #[arg(long, env = "COVID_DASH_DATA_URL", default_value = DEFAULT_DATA_URL)]
    pub data_url: String,
    /// 不访问网络，直接读本地文件
    #[arg(long, env = "COVID_DASH_OFFLINE")]
    pub offline: bool,
    #[arg(long, env = "COVID_DASH_DATA_FILE", default_value = DEFAULT_DATA_FILE)]
    pub data_file: String,
    #[arg(long, env = "COVID_DASH_COORDINATES_URL")]
    pub coordinates_url: Option<String>,
    #[arg(long, env = "COVID_DASH_COORDINATES_FILE", default_value = DEFAULT_COORDINATES_FILE)]
    pub coordinates_file: String,
    #[arg(long, env = "COVID_DASH_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct Window {
    /// YYYY-MM-DD，默认 2020-03-01
    #[arg(long)]
    pub start: Option<String>,
    /// YYYY-MM-DD，默认今天
    #[arg(long)]
    pub end: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportTable {
    Deaths,
    Highs,
    Map,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// 所选国家的累计死亡折线图
    Line {
        #[arg(long = "country")]
        countries: Vec<String>,
        #[command(flatten)]
        window: Window,
    },
    /// 按指标排名前 N 的国家
    Top {
        #[arg(long, default_value = "total_deaths")]
        metric: String,
        #[arg(short, long, default_value_t = DEFAULT_TOP_N)]
        n: usize,
    },
    /// 世界地图
    Map {
        #[arg(long, default_value = "total_cases")]
        metric: String,
    },
    /// 单个国家的累计或每日柱状图
    Detail {
        #[arg(long, default_value = DEFAULT_DETAIL_COUNTRY)]
        country: String,
        #[command(flatten)]
        window: Window,
        #[arg(long, default_value = "cumulative")]
        mode: String,
    },
    /// 悬停/点击某个国家时的信息
    Info {
        #[arg(long = "country")]
        countries: Vec<String>,
        #[arg(long)]
        index: Option<usize>,
    },
    /// 下拉框选项
    Options,
    /// 把推导出来的表导出成 CSV
    Export {
        #[arg(long, value_enum)]
        table: ExportTable,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

impl From<&Cli> for SourceConfig {
    fn from(cli: &Cli) -> Self {
        Self {
            data_url: (!cli.offline).then(|| cli.data_url.clone()),
            data_file: cli.data_file.clone(),
            coordinates_url: cli.coordinates_url.clone().filter(|_| !cli.offline),
            coordinates_file: cli.coordinates_file.clone(),
            timeout: Duration::from_secs(cli.timeout_secs),
        }
    }
}

/// 把命令行参数叠加到默认选择上
pub fn selection(command: &Command) -> Result<Selection, DashError> {
    let mut selection = Selection::default();
    match command {
        Command::Line { countries, window } => {
            if !countries.is_empty() {
                selection.countries = countries.clone();
            }
            apply_window(&mut selection, window)?;
        }
        Command::Top { metric, n } => {
            selection.ranking_metric = metric.parse()?;
            selection.top_n = *n;
        }
        Command::Map { metric } => selection.map_metric = metric.parse()?,
        Command::Detail {
            country,
            window,
            mode,
        } => {
            selection.country = country.clone();
            selection.mode = mode.parse()?;
            apply_window(&mut selection, window)?;
        }
        Command::Info { countries, index } => {
            if !countries.is_empty() {
                selection.countries = countries.clone();
            }
            selection.hovered = *index;
        }
        Command::Options | Command::Export { .. } => {}
    }
    Ok(selection)
}

fn apply_window(selection: &mut Selection, window: &Window) -> Result<(), DashError> {
    if let Some(start) = &window.start {
        selection.start = parse_date(start)?;
    }
    if let Some(end) = &window.end {
        selection.end = parse_date(end)?;
    }
    Ok(())
}
