// src/main.rs
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use sov_notes::activities::{ActivityBoard, SectionTotals, ACTIVITY_CODES};
use sov_notes::config::{ExtractionConfig, RowRange};
use sov_notes::extractors::{Section, SovExtractor, SovItem};
use sov_notes::notes;
use sov_notes::storage::{RunInfo, StorageManager};
use sov_notes::utils::{self, error::GroupingError, AppError};
use sov_notes::workbook::{loader, WorkbookSource};

// Rows dumped in --debug mode.
const DEBUG_DUMP_ROWS: RowRange = RowRange { start: 1, end: 350 };

/// Command Line Interface for the SOV to billing notes converter
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// SOV workbook (.xlsx / .xls)
    #[arg(short, long, required_unless_present = "list_codes")]
    input: Option<PathBuf>,

    /// Contractor named in the note ("Per <contractor> SOV:")
    #[arg(short, long, required_unless_present = "list_codes")]
    contractor: Option<String>,

    /// Note date, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Activity code receiving every item left unassigned after --assign-item / --assign (e.g. 5060)
    #[arg(short, long)]
    activity: Option<String>,

    /// Assign all items of a section to an activity code: SECTION=CODE (repeatable)
    #[arg(long = "assign", value_parser = parse_assignment)]
    assignments: Vec<(Section, String)>,

    /// Assign a single item by id to an activity code: ID=CODE (repeatable, applied first)
    #[arg(long = "assign-item", value_parser = parse_item_assignment)]
    item_assignments: Vec<(u32, String)>,

    /// Output directory for the note and JSON files
    #[arg(short, long, default_value = "./output")]
    output_dir: String,

    /// Debug mode - save a dump of the target sheet rows
    #[arg(short, long)]
    debug: bool,

    /// Print the activity codes and exit
    #[arg(long)]
    list_codes: bool,

    /// Sheet holding the SOV (overrides SOV_SHEET_NAME)
    #[arg(long)]
    sheet_name: Option<String>,

    /// Main contract rows, START-END (overrides SOV_MAIN_ROWS)
    #[arg(long)]
    main_rows: Option<RowRange>,

    /// Pass-through rows, START-END (overrides SOV_PASS_THROUGH_ROWS)
    #[arg(long)]
    pass_through_rows: Option<RowRange>,

    /// Change-order rows, START-END (overrides SOV_PCO_ROWS)
    #[arg(long)]
    pco_rows: Option<RowRange>,

    /// First row no longer treated as a pass-through (overrides SOV_PASS_THROUGH_CEILING)
    #[arg(long)]
    pass_through_ceiling: Option<u32>,
}

fn parse_assignment(value: &str) -> Result<(Section, String), String> {
    let (section, code) = value
        .split_once('=')
        .ok_or_else(|| format!("expected SECTION=CODE, got '{}'", value))?;
    Ok((section.parse()?, code.trim().to_string()))
}

fn parse_item_assignment(value: &str) -> Result<(u32, String), String> {
    let (id, code) = value
        .split_once('=')
        .ok_or_else(|| format!("expected ID=CODE, got '{}'", value))?;
    let id = id
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not an item id", id.trim()))?;
    Ok((id, code.trim().to_string()))
}

impl Args {
    /// Layers CLI overrides on top of the environment configuration.
    fn extraction_config(&self) -> Result<ExtractionConfig, AppError> {
        let mut config = ExtractionConfig::from_env()?;
        if let Some(name) = &self.sheet_name {
            config.sheet_name = name.clone();
        }
        if let Some(range) = self.main_rows {
            config.main_rows = range;
        }
        if let Some(range) = self.pass_through_rows {
            config.pass_through_rows = range;
        }
        if let Some(range) = self.pco_rows {
            config.pco_rows = range;
        }
        if let Some(ceiling) = self.pass_through_ceiling {
            config.pass_through_ceiling = ceiling;
        }
        Ok(config)
    }
}

/// Applies item assignments, then section assignments, then sends whatever is
/// left to --activity. Without any explicit assignment everything lands in one
/// activity (unnamed unless --activity names a code).
fn group_items(args: &Args, items: &mut [SovItem]) -> Result<ActivityBoard, AppError> {
    let mut board = ActivityBoard::new();

    for (item_id, code) in &args.item_assignments {
        let activity = board.activity_for_code(code)?;
        board.assign(items, activity, *item_id)?;
        tracing::info!("Assigned item {} to {}", item_id, code);
    }

    for (section, code) in &args.assignments {
        let activity = board.activity_for_code(code)?;
        match board.assign_section(items, activity, *section) {
            Ok(count) => tracing::info!("Assigned {} {} items to {}", count, section, code),
            Err(GroupingError::NoUnassignedItems) => {
                tracing::warn!("No unassigned {} items for {}", section, code)
            }
            Err(e) => return Err(e.into()),
        }
    }

    let explicit = !args.item_assignments.is_empty() || !args.assignments.is_empty();
    let leftover = match args.activity.as_deref() {
        Some(code) => Some(board.activity_for_code(code)?),
        None if !explicit => Some(board.add_activity(None)?),
        None => None,
    };
    if let Some(activity) = leftover {
        match board.assign_all(items, activity) {
            Ok(count) => tracing::info!("Added {} items to the activity.", count),
            Err(GroupingError::NoUnassignedItems) => tracing::warn!("No unassigned items available."),
            Err(e) => return Err(e.into()),
        }
    }

    Ok(board)
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting processing for args: {:?}", args);

    if args.list_codes {
        for code in ACTIVITY_CODES {
            println!("{}", code);
        }
        return Ok(());
    }

    let input = args
        .input
        .clone()
        .ok_or_else(|| AppError::Config("--input is required".to_string()))?;
    let contractor = args
        .contractor
        .clone()
        .ok_or_else(|| AppError::Config("--contractor is required".to_string()))?;
    let date = args
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    // 3. Resolve the spreadsheet layout
    let config = args.extraction_config()?;
    tracing::debug!("Extraction config: {:?}", config);

    // 4. Initialize storage
    let storage = StorageManager::new(&args.output_dir)?;

    // 5. Load the workbook
    let workbook = loader::load_workbook(&input).await?;
    tracing::info!("Workbook loaded. Sheet names: {:?}", workbook.sheet_names());

    if args.debug {
        match workbook.sheet(&config.sheet_name) {
            Some(sheet) => {
                let dump_path = storage.debug_dir()?.join("sheet_dump.txt");
                if let Err(e) = utils::sheet_dump::save_sheet_dump(sheet, &config.sheet_name, DEBUG_DUMP_ROWS, &dump_path) {
                    tracing::warn!("Failed to create sheet dump: {}", e);
                }
            }
            None => tracing::warn!("No sheet \"{}\" to dump", config.sheet_name),
        }
    }

    // 6. Extract SOV items
    let extractor = SovExtractor::new(config);
    let extraction = extractor.extract_with_report(&workbook)?;
    let mut items = extraction.items;

    if items.is_empty() {
        tracing::warn!("No billable items found in \"{}\"", extractor.config().sheet_name);
    }

    // 7. Group items into activities
    let board = group_items(&args, &mut items)?;

    let totals = SectionTotals::from_items(&items);
    let unassigned = totals.item_count - totals.assigned_count;
    if unassigned > 0 {
        tracing::warn!("{} items were not assigned to any activity and are left out of the note", unassigned);
    }
    tracing::info!("Totals:\n{}", notes::totals_report(&totals));
    tracing::info!("Activity summary:\n{}", notes::activity_summary(&board, &items));

    // 8. Render and save the note
    let note = notes::format_note(&board, &items, &contractor, date);
    println!("{}", note);

    match storage.save_note(&contractor, date, &note) {
        Ok(path) => tracing::info!("Saved note to: {}", path.display()),
        Err(e) => tracing::error!("Failed to save note: {}", e),
    }

    match storage.save_items(&items) {
        Ok(path) => tracing::info!("Saved items to: {}", path.display()),
        Err(e) => tracing::error!("Failed to save items: {}", e),
    }

    let run = RunInfo {
        source_file: &input,
        sheet_name: &extractor.config().sheet_name,
        contractor: &contractor,
        date,
    };
    match storage.save_run_metadata(&run, &items, &extraction.passes, &board) {
        Ok(path) => tracing::info!("Saved run metadata to: {}", path.display()),
        Err(e) => tracing::error!("Failed to save run metadata: {}", e),
    }

    tracing::info!("Processing finished. {} items, total {}", totals.item_count, notes::format_currency(totals.total));

    Ok(())
}
