use crate::cli::{GenerateArgs, InputArgs, PreviewArgs};
use crate::ingest::read_table;
use crate::normalize::{normalize_table, NormalizeStats};
use crate::output::{write_batch, Manifest, OutputBatch};
use crate::partition::{partition_by_theme, ThemePartition};
use crate::render::render_theme;
use crate::report::{assemble, assemble_combined};
use crate::serialize::TextRenderer;
use anyhow::{anyhow, Context, Result};
use chrono::Local;

/// Title of the combined document.
const COMBINED_TITLE: &str = "Relatório por Objetivo Estratégico";

struct Loaded {
    partition: ThemePartition,
    stats: NormalizeStats,
}

fn load_partition(input: &InputArgs) -> Result<Loaded> {
    let table = read_table(&input.input, input.sheet.as_deref())
        .with_context(|| format!("load {}", input.input.display()))?;
    let normalized = normalize_table(&table)?;
    let stats = normalized.stats.clone();
    tracing::info!(
        rows = stats.rows_read,
        kept = stats.rows_kept,
        dropped_status = stats.dropped_status,
        unparseable_dates = stats.unparseable_dates,
        "table normalized"
    );
    Ok(Loaded {
        partition: partition_by_theme(normalized.records),
        stats,
    })
}

pub fn run_generate(args: GenerateArgs) -> Result<()> {
    let loaded = load_partition(&args.input)?;
    if loaded.partition.is_empty() {
        eprintln!(
            "warning: no strategic theme (Objetivo Estratégico) found in {}; nothing to generate",
            args.input.input.display()
        );
        return Ok(());
    }

    let renderer = args.format.renderer();
    let manifest = Manifest {
        generated_on: args.date.unwrap_or_else(|| Local::now().date_naive()),
        input: args.input.input.display().to_string(),
        format: args.format,
        combined: args.combined,
        normalize: loaded.stats,
        artifacts: Vec::new(),
    };

    let published = if args.combined {
        let artifact = assemble_combined(COMBINED_TITLE, &loaded.partition, renderer.as_ref())?
            .ok_or_else(|| anyhow!("combined report is empty"))?;
        let batch = OutputBatch::combined(&artifact, renderer.extension(), manifest);
        write_batch(&args.out_dir, &batch)?;
        batch.manifest.artifacts
    } else {
        let jobs = args.jobs.map(usize::from);
        let reports = assemble(&loaded.partition, renderer.as_ref(), jobs)?;
        let batch = OutputBatch::per_theme(&reports, renderer.extension(), manifest);
        write_batch(&args.out_dir, &batch)?;
        batch.manifest.artifacts
    };

    println!("generated {} report(s) in {}", published.len(), args.out_dir.display());
    for entry in &published {
        match &entry.theme {
            Some(theme) => println!("  {} ({} initiatives): {}", theme, entry.records, entry.file),
            None => println!("  {} initiatives: {}", entry.records, entry.file),
        }
    }
    Ok(())
}

pub fn run_preview(args: PreviewArgs) -> Result<()> {
    let loaded = load_partition(&args.input)?;
    let mut printed = 0usize;
    for (theme, records) in &loaded.partition {
        if args.theme.as_deref().is_some_and(|wanted| wanted != theme) {
            continue;
        }
        let document = render_theme(theme, records);
        println!("#### {theme} ####\n");
        print!("{}", TextRenderer.render_string(&document));
        printed += 1;
    }

    if printed == 0 {
        match args.theme {
            Some(theme) => return Err(anyhow!("theme {theme:?} not found in input")),
            None => eprintln!("warning: no strategic theme found; nothing to show"),
        }
    }
    Ok(())
}
