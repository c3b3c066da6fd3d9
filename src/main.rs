
use indexmap::IndexMap;
use log::{LevelFilter, debug, error, info, warn};
use serde::Serialize;
use std::time::Instant;

use repoverlap::cli::core::{Commands, get_cli};
use repoverlap::cli::diversity::{DiversitySettings, check_diversity_settings};
use repoverlap::cli::expanded::{ExpandedSettings, check_expanded_settings};
use repoverlap::cli::input::InputSettings;
use repoverlap::cli::overlap::{OverlapSettings, check_overlap_settings};
use repoverlap::cli::usage::{UsageSettings, check_usage_settings};
use repoverlap::cli::venn::{VennSettings, check_venn_settings};
use repoverlap::data_types::collection::Collection;
use repoverlap::data_types::partition::RegionKey;
use repoverlap::data_types::repertoire_error::RepertoireError;
use repoverlap::data_types::similarity_matrix::SimilarityMatrix;
use repoverlap::diversity::sample_diversity;
use repoverlap::expansion::{expanded_keys, expanded_overlap};
use repoverlap::filtering::{ConditionGroups, filter_by_individual, filter_by_tissue, filter_samples, individuals};
use repoverlap::gene_usage::{pooled_v_gene_usage, v_gene_usage};
use repoverlap::similarity::{jaccard_matrix, tissue_pair_similarities};
use repoverlap::util::file_io::save_json;
use repoverlap::venn_solver::{filter_region_rows, venn2_sets, venn_counts};
use repoverlap::writers::gene_usage_table::write_gene_usage;
use repoverlap::writers::sample_summary::{DiversityWriter, ExpansionWriter};
use repoverlap::writers::similarity_table::{write_similarity_matrix, write_tissue_pairs};
use repoverlap::writers::venn_table::{write_region_rows, write_venn_counts};

/// Sets up logging before we check the other settings
fn init_logging(verbosity: u8) {
    let filter_level: LevelFilter = match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace
    };
    env_logger::builder()
        .format_timestamp_millis()
        .filter_level(filter_level)
        .init();
}

/// Creates the output folder and saves the CLI options into it
fn prepare_output<T: Serialize>(input: &InputSettings, settings: &T) {
    info!("Creating output folder at {:?}...", input.output_folder);
    match std::fs::create_dir_all(&input.output_folder) {
        Ok(()) => {},
        Err(e) => {
            error!("Error while creating output folder: {e}");
            std::process::exit(exitcode::IOERR);
        }
    }

    let cli_json = input.output_folder.join("cli_settings.json");
    info!("Saving CLI options to {cli_json:?}...");
    if let Err(e) = save_json(settings, &cli_json) {
        error!("Error while saving CLI options: {e:#}");
        std::process::exit(exitcode::IOERR);
    }
}

/// Loads every glob, exiting with a data error for malformed inputs and an I/O error otherwise
fn load_inputs(input: &InputSettings) -> Vec<Collection> {
    match input.load_collections() {
        Ok(c) => c,
        Err(e) => {
            error!("Error while loading repertoires: {e:#}");
            if e.downcast_ref::<RepertoireError>().is_some() {
                std::process::exit(exitcode::DATAERR);
            }
            std::process::exit(exitcode::IOERR);
        }
    }
}

/// Exits on a failed output write
fn check_write(result: anyhow::Result<()>, label: &str) {
    if let Err(e) = result {
        error!("Error while writing {label}: {e:#}");
        std::process::exit(exitcode::IOERR);
    }
}

/// Exits on a domain error
fn check_data<T>(result: Result<T, RepertoireError>, label: &str) -> T {
    match result {
        Ok(v) => v,
        Err(e) => {
            error!("Error while {label}: {e}");
            std::process::exit(exitcode::DATAERR);
        }
    }
}

/// Output label for a loaded glob: the chain of its first sample, or the glob index if it is empty
fn collection_label(collection: &Collection, index: usize) -> String {
    collection.get_index(0)
        .map(|s| s.metadata().chain().to_string())
        .unwrap_or_else(|| format!("set{index}"))
}

fn run_overlap(settings: OverlapSettings) {
    // start the timer
    let start_time = Instant::now();
    init_logging(settings.input.verbosity);

    let settings = match check_overlap_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };
    prepare_output(&settings.input, &settings);
    let collections = load_inputs(&settings.input);
    let key = settings.input.identity_key;

    // full matrix for each glob, then one matrix per individual and chain
    let mut per_collection: Vec<IndexMap<u32, SimilarityMatrix>> = vec![];
    let mut per_individual = IndexMap::new();
    for (index, collection) in collections.iter().enumerate() {
        let label = collection_label(collection, index);
        info!("Computing {} pairwise similarities for {label}...", collection.len() * collection.len().saturating_sub(1) / 2);
        let matrix = jaccard_matrix(collection, key);
        let matrix_fn = settings.input.table_path(&format!("jaccard_{label}"));
        info!("Saving similarity matrix to {matrix_fn:?}...");
        check_write(write_similarity_matrix(&matrix_fn, &matrix), "similarity matrix");

        let mut individual_matrices = IndexMap::new();
        for individual in individuals(collection) {
            let subset = filter_by_individual(collection, individual);
            let chain = match subset.get_index(0) {
                Some(s) => s.metadata().chain(),
                None => continue
            };
            let matrix = jaccard_matrix(&subset, key);
            individual_matrices.insert(individual, matrix.clone());
            if per_individual.insert((individual, chain), (subset, matrix)).is_some() {
                warn!("Individual {individual} with chain {chain} found in multiple globs, keeping the last one");
            }
        }
        per_collection.push(individual_matrices);
    }

    // two globs are displayed together, the first above the diagonal and the second below
    if per_collection.len() == 2 {
        let layout = settings.input.name_layout();
        for (individual, upper) in per_collection[0].iter() {
            let Some(lower) = per_collection[1].get(individual) else {
                debug!("Individual {individual} missing from the second glob, skipping stacked matrix");
                continue;
            };
            // chains differ between globs, so rows are matched by tissue code
            let aligned = SimilarityMatrix::stack_aligned(upper, lower, |name| {
                layout.tissue_code(name).map(|c| c.to_string()).unwrap_or_else(|_| name.to_string())
            });
            match aligned {
                Ok(stacked) => {
                    let stacked_fn = settings.input.table_path(&format!("jaccard_stacked_individual{individual}"));
                    info!("Saving stacked matrix to {stacked_fn:?}...");
                    check_write(write_similarity_matrix(&stacked_fn, &stacked), "stacked matrix");
                },
                Err(e) => warn!("Skipping stacked matrix for individual {individual}: {e}")
            };
        }
    }

    let conditions = match settings.condition_groups() {
        Ok(Some(groups)) => groups,
        Ok(None) => {
            let mut all: Vec<u32> = per_individual.keys().map(|(i, _c)| *i).collect();
            all.sort();
            all.dedup();
            ConditionGroups::single_group("ALL", all)
        },
        Err(e) => {
            error!("Error while building conditions: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };
    let pairs = tissue_pair_similarities(&per_individual, &conditions, &settings.pair_tissues);
    let pairs_fn = settings.input.table_path("tissue_pairs");
    info!("Saving tissue-pair similarities to {pairs_fn:?}...");
    check_write(write_tissue_pairs(&pairs_fn, &pairs), "tissue-pair similarities");

    info!("Overlap completed in {} seconds.", start_time.elapsed().as_secs_f64());
}

fn run_venn(settings: VennSettings) {
    // start the timer
    let start_time = Instant::now();
    init_logging(settings.input.verbosity);

    let settings = match check_venn_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };
    prepare_output(&settings.input, &settings);
    let collections = load_inputs(&settings.input);
    let key = settings.input.identity_key;

    for (index, collection) in collections.iter().enumerate() {
        let label = collection_label(collection, index);
        for individual in individuals(collection) {
            let subset = filter_by_individual(collection, individual);
            let counts = check_data(
                venn_counts(&subset.identity_map(key)),
                &format!("computing Venn regions for individual {individual} (use --tissue to select 2 or 3 tissues)")
            );
            let venn_fn = settings.input.table_path(&format!("venn_{label}_individual{individual}"));
            info!("Saving Venn counts to {venn_fn:?}...");
            check_write(write_venn_counts(&venn_fn, &counts), "Venn counts");
        }
    }

    if let Some(region) = settings.region.as_deref() {
        let requested = RegionKey::from_label(region);
        let found = collections.iter()
            .map(|c| filter_samples(c, |s| requested.contains(s.name())))
            .find(|c| c.len() == 2);
        let Some(pair) = found else {
            error!("Error while filtering region rows: no loaded glob contains both samples of {region:?}");
            std::process::exit(exitcode::DATAERR);
        };

        let partition = check_data(venn2_sets(&pair.identity_map(key)), "computing the two-sample overlap");
        let rows = check_data(filter_region_rows(region, &partition, &pair, key), "filtering region rows");
        let rows_fn = settings.input.table_path("region_rows");
        info!("Saving {} region rows to {rows_fn:?}...", rows.values().map(|s| s.records().len()).sum::<usize>());
        check_write(write_region_rows(&rows_fn, &rows), "region rows");
    }

    info!("Venn completed in {} seconds.", start_time.elapsed().as_secs_f64());
}

fn run_diversity(settings: DiversitySettings) {
    // start the timer
    let start_time = Instant::now();
    init_logging(settings.input.verbosity);

    let settings = match check_diversity_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };
    prepare_output(&settings.input, &settings);
    let collections = load_inputs(&settings.input);

    let mut diversity_writer = DiversityWriter::default();
    for sample in collections.iter().flat_map(|c| c.iter()) {
        match sample_diversity(sample, settings.input.identity_key) {
            Ok(index) => {
                debug!("{}: {:.3} effective species", sample.name(), index.effective_species);
                diversity_writer.add_sample(sample, &index);
            },
            Err(e @ RepertoireError::EmptySample { .. }) => warn!("Skipping: {e}"),
            Err(e) => {
                error!("Error while computing diversity: {e}");
                std::process::exit(exitcode::DATAERR);
            }
        };
    }

    let diversity_fn = settings.input.table_path("diversity");
    info!("Saving diversity for {} samples to {diversity_fn:?}...", diversity_writer.len());
    check_write(diversity_writer.write_summary(&diversity_fn), "diversity");

    info!("Diversity completed in {} seconds.", start_time.elapsed().as_secs_f64());
}

fn run_expanded(settings: ExpandedSettings) {
    // start the timer
    let start_time = Instant::now();
    init_logging(settings.input.verbosity);

    let settings = match check_expanded_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };
    prepare_output(&settings.input, &settings);
    let collections = load_inputs(&settings.input);
    let key = settings.input.identity_key;

    let mut expansion_writer = ExpansionWriter::default();
    for collection in collections.iter() {
        for individual in individuals(collection) {
            let subset = filter_by_individual(collection, individual);
            let source = filter_by_tissue(&subset, &[settings.source_tissue.as_str()]);
            let target = filter_by_tissue(&subset, &[settings.target_tissue.as_str()]);
            let (Some(source), Some(target)) = (source.get_index(0), target.get_index(0)) else {
                warn!("Individual {individual} is missing {} or {}, skipping", settings.source_tissue, settings.target_tissue);
                continue;
            };

            let expanded = expanded_keys(source, key, settings.min_count).len();
            let fraction = expanded_overlap(source, target, key, settings.min_count);
            expansion_writer.add_comparison(source, target, expanded, fraction);
        }
    }

    let expanded_fn = settings.input.table_path("expanded_overlap");
    info!("Saving {} comparisons to {expanded_fn:?}...", expansion_writer.len());
    check_write(expansion_writer.write_summary(&expanded_fn), "expanded overlap");

    info!("Expansion completed in {} seconds.", start_time.elapsed().as_secs_f64());
}

fn run_usage(settings: UsageSettings) {
    // start the timer
    let start_time = Instant::now();
    init_logging(settings.input.verbosity);

    let settings = match check_usage_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };
    prepare_output(&settings.input, &settings);
    let collections = load_inputs(&settings.input);

    let mut usage = IndexMap::new();
    for (index, collection) in collections.iter().enumerate() {
        if !settings.pooled_only {
            for sample in collection.iter() {
                usage.insert(sample.name().to_string(), v_gene_usage(sample));
            }
        }
        usage.insert(format!("pooled_{}", collection_label(collection, index)), pooled_v_gene_usage(collection));
    }

    let usage_fn = settings.input.table_path("v_gene_usage");
    info!("Saving V gene usage to {usage_fn:?}...");
    check_write(write_gene_usage(&usage_fn, &usage), "gene usage");

    info!("Usage completed in {} seconds.", start_time.elapsed().as_secs_f64());
}

fn main() {
    let cli = get_cli();
    match cli.command {
        Commands::Overlap(settings) => {
            run_overlap(*settings);
        },
        Commands::Venn(settings) => {
            run_venn(*settings);
        },
        Commands::Diversity(settings) => {
            run_diversity(*settings);
        },
        Commands::Expanded(settings) => {
            run_expanded(*settings);
        },
        Commands::Usage(settings) => {
            run_usage(*settings);
        }
    }

    info!("Process finished successfully.");
}
