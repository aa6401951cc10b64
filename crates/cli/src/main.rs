use anyhow::Result;
use clap::{Parser, ValueEnum};
use exifdate_renamer_core::{
    apply_plan, generate_plan, load_config, ApplyResult, ExifTimestampSource, FileRole,
    PlanOptions, RenameOutcome, RenamePlan,
};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "exifdate-renamer-cli")]
#[command(about = "画像ファイル名をEXIF撮影日時のYYYYMMDD_HHMMSS形式に一括リネームします")]
struct Cli {
    /// 処理対象のルートフォルダ
    root: PathBuf,
    /// 計画の表示のみ。実ファイルは変更しない
    #[arg(long, default_value_t = false)]
    dry_run: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    /// 主画像として扱う拡張子の上書き (複数指定可)
    #[arg(long)]
    image_ext: Vec<String>,
    /// サイドカーとして扱う拡張子の上書き (複数指定可)
    #[arg(long)]
    sidecar_ext: Vec<String>,
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto)?;

    let config = load_config()?;
    let mut options = PlanOptions::from_config(cli.root, &config);
    if !cli.image_ext.is_empty() {
        options.image_extensions = cli.image_ext;
    }
    if !cli.sidecar_ext.is_empty() {
        options.sidecar_extensions = cli.sidecar_ext;
    }

    let plan = generate_plan(&options, &ExifTimestampSource)?;

    if cli.dry_run {
        match cli.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
            OutputFormat::Table => print_plan(&plan),
        }
        eprintln!("dry-runモード: 実ファイルは変更していません。");
        return Ok(());
    }

    let result = apply_plan(&plan);
    match cli.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Table => print_outcomes(&plan, &result),
    }
    eprintln!(
        "適用完了: {}件 (変更なし {}件 / 失敗 {}件)",
        result.applied, result.unchanged, result.failed
    );

    Ok(())
}

fn print_plan(plan: &RenamePlan) {
    print_skips(plan);
    for candidate in &plan.candidates {
        println!("処理対象: {}", candidate.original_path.display());
        if candidate.changed {
            println!(
                "予定: {} -> {}",
                candidate.original_path.display(),
                candidate.target_path.display()
            );
        } else {
            println!("変更なし: {}", candidate.original_path.display());
        }
        for sidecar in &candidate.sidecars {
            println!(
                "予定: {} -> {}",
                sidecar.original_path.display(),
                sidecar.target_path.display()
            );
        }
    }
    print_stats(plan);
}

fn print_outcomes(plan: &RenamePlan, result: &ApplyResult) {
    print_skips(plan);
    for report in &result.reports {
        if report.role == FileRole::Primary {
            println!("処理対象: {}", report.original_path.display());
        }
        match &report.outcome {
            RenameOutcome::Renamed => println!(
                "リネーム: {} -> {}",
                report.original_path.display(),
                report.target_path.display()
            ),
            RenameOutcome::Unchanged => {
                println!("変更なし: {}", report.original_path.display())
            }
            RenameOutcome::Failed(reason) => {
                println!("失敗: {} ({})", report.original_path.display(), reason)
            }
        }
    }
    print_stats(plan);
}

fn print_skips(plan: &RenamePlan) {
    for skipped in &plan.skipped {
        println!("スキップ: {} ({})", skipped.path.display(), skipped.reason);
    }
}

fn print_stats(plan: &RenamePlan) {
    println!(
        "\n集計: scanned={} primary={} non_primary_skip={} no_metadata_skip={} planned={} unchanged={} sidecars={}",
        plan.stats.scanned_files,
        plan.stats.primary_files,
        plan.stats.skipped_non_primary,
        plan.stats.skipped_no_metadata,
        plan.stats.planned,
        plan.stats.unchanged,
        plan.stats.sidecars
    );
}
