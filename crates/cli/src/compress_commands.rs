use std::path::PathBuf;

use {
    anyhow::{Context, Result, bail},
    pdfsqueeze_config::PdfsqueezeConfig,
    pdfsqueeze_pipeline::{Compress, GhostscriptCompressor},
};

#[derive(clap::Args)]
pub struct CompressArgs {
    /// PDF to compress.
    pub input: PathBuf,
    /// Where to write the compressed copy.
    pub output: PathBuf,
}

pub async fn compress(args: CompressArgs, config: &PdfsqueezeConfig) -> Result<()> {
    if args.input == args.output {
        bail!("input and output must be different files");
    }
    let before = tokio::fs::metadata(&args.input)
        .await
        .with_context(|| format!("reading {}", args.input.display()))?
        .len();

    let compressor = GhostscriptCompressor::new(&config.pipeline.ghostscript);
    compressor.compress(&args.input, &args.output).await?;

    let after = tokio::fs::metadata(&args.output)
        .await
        .with_context(|| format!("reading {}", args.output.display()))?
        .len();
    println!(
        "{} -> {}: {} -> {} ({})",
        args.input.display(),
        args.output.display(),
        human_size(before),
        human_size(after),
        reduction(before, after)
    );
    Ok(())
}

fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

fn reduction(before: u64, after: u64) -> String {
    if before == 0 {
        return "n/a".into();
    }
    let pct = (1.0 - after as f64 / before as f64) * 100.0;
    if pct >= 0.0 {
        format!("{pct:.0}% smaller")
    } else {
        format!("{:.0}% larger", -pct)
    }
}
