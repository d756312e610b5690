mod classifier;
mod config;
mod error;
mod package_manager;
mod report;
mod sysinfo;
mod validator;
mod version;

use anyhow::Result;
use clap::Parser;
use config::Config;
use error::CleanupError;
use log::LevelFilter;
use package_manager::{AptCache, PackageCache};
use report::CommitStatus;
use sysinfo::SystemInfo;
use validator::Validated;
use std::path::PathBuf;

/// Evaluate installed Linux kernel packages and purge any that are not the
/// current version or the newest version.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Don't actually delete anything; just print what would've been
    /// deleted. Implies verbose (not quiet).
    #[arg(short = 'n', long = "dryrun", conflicts_with = "quiet")]
    dry_run: bool,

    /// Run silent, run deep.
    #[arg(short, long)]
    quiet: bool,

    /// Config file (default: ~/.config/kernel-cleanup/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Save a report of this run under the configured report directory.
    #[arg(long)]
    report: bool,
}

extern "C" fn on_interrupt(_: libc::c_int) {
    const MSG: &[u8] = b"(130) Halted via interrupt.\n";
    unsafe {
        libc::write(libc::STDERR_FILENO, MSG.as_ptr().cast(), MSG.len());
        libc::_exit(130);
    }
}

fn install_interrupt_handler() {
    let handler: extern "C" fn(libc::c_int) = on_interrupt;
    unsafe {
        libc::signal(libc::SIGINT, handler as libc::sighandler_t);
    }
}

fn init_logger(quiet: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if quiet {
        builder.filter_level(LevelFilter::Off);
    }
    builder.format_timestamp(None).init();
}

fn main() -> Result<()> {
    install_interrupt_handler();

    let cli = Cli::parse();
    init_logger(cli.quiet);

    if let Err(e) = run(&cli) {
        if let Some(message) = fatal_message(&e) {
            eprintln!("{}", message);
            std::process::exit(1);
        }
        return Err(e);
    }

    Ok(())
}

/// 内核版本无法识别时输出的诊断信息，其他错误交给 anyhow 处理
fn fatal_message(e: &anyhow::Error) -> Option<String> {
    match e.downcast_ref::<CleanupError>() {
        Some(err @ CleanupError::KernelVersion { .. }) => Some(format!("ERROR: {}", err)),
        _ => None,
    }
}

/// 一次运行的开关
#[derive(Debug, Clone, Copy, Default)]
struct RunOptions {
    dry_run: bool,
    quiet: bool,
    report: bool,
}

impl From<&Cli> for RunOptions {
    fn from(cli: &Cli) -> Self {
        Self {
            dry_run: cli.dry_run,
            quiet: cli.quiet,
            report: cli.report,
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default()?,
    };

    let mut cache = AptCache::open(&config.dpkg_query, &config.apt_get)?;
    cache.set_quiet(cli.quiet);

    let system = SystemInfo::detect();
    execute(RunOptions::from(cli), &config, &mut cache, &system)?;

    Ok(())
}

/// 分类、校验、标记，非 dry run 时提交；需要时在提交之后保存报告
fn execute<C: PackageCache + ?Sized>(
    opts: RunOptions,
    config: &Config,
    cache: &mut C,
    system: &SystemInfo,
) -> Result<Validated> {
    let kernel = system.kernel_version()?;
    if !opts.quiet {
        println!("{}", system.platform());
        println!();
    }
    log::debug!("running kernel: {}", kernel);

    let table = classifier::classify(
        &kernel,
        &package_manager::records(&*cache),
        &config.families,
    );
    let validated = validator::validate_and_mark(table, cache, config.purge)?;

    let summary = report::render_table(&validated.table);
    if !opts.quiet {
        print!("{}", summary);
    }

    let committed = if opts.dry_run {
        Ok(CommitStatus::DryRun)
    } else {
        log::info!("committing {} marked package(s)", validated.deletions.len());
        cache.commit().map(|()| CommitStatus::Committed)
    };

    if opts.report || config.save_report {
        let status = match &committed {
            Ok(status) => status.clone(),
            Err(e) => CommitStatus::Failed(e.to_string()),
        };
        let saver = report::ReportSaver::new(config.report_dir.clone());
        let path = saver.save(&summary, &validated, &status)?;
        log::info!("report saved to {}", path.display());
    }

    committed?;
    Ok(validated)
}
