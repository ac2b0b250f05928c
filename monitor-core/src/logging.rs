use crate::constants::logging;

/// # 日志系统
///
/// 库代码只使用 `tracing` 宏，由嵌入方在入口处决定日志配置：
///
/// - `RUST_LOG`：标准的日志级别控制，例如 `monitor_core=debug`
/// - `MONITOR_LOG_FILE`：设置后日志追加到该文件而非终端
///
/// 终端输出使用紧凑格式；文件输出包含模块路径和行号。
/// 令牌永远不会被写入日志。
pub fn setup_logging(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    // 根据verbose参数和环境变量确定日志级别
    let default_level = if verbose {
        logging::VERBOSE_LOG_LEVEL
    } else {
        logging::DEFAULT_LOG_LEVEL
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let log_file = std::env::var(logging::LOG_FILE_ENV).ok().and_then(|path| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| eprintln!("无法打开日志文件 {path}: {e}"))
            .ok()
    });

    let result = if let Some(file) = log_file {
        fmt()
            .with_env_filter(env_filter)
            .with_writer(std::sync::Mutex::new(file))
            .with_target(true)
            .with_thread_names(true)
            .with_line_number(true)
            .try_init()
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false)
            .without_time()
            .compact()
            .try_init()
    };

    if let Err(e) = result {
        eprintln!("日志系统已初始化，忽略重复配置: {e}");
    }
}

/// 最小化日志初始化，已有全局订阅者时静默忽略
pub fn setup_minimal_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .try_init();
}
