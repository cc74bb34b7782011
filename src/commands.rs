use std::path::Path;

use crate::error::Result;
use crate::filter::DateWindow;
use crate::pipeline::{TrackerOptions, run_support_tracker};
use crate::report::{FinalRow, read_final_rows, write_final_csv, write_intermediate_csv};
use crate::settings::Settings;
use crate::slack::{ChatApi, SlackWebClient};
use crate::{load_token, parse_optional_date};

pub fn run_track(
    support_handle: &str,
    output: &str,
    final_output: &str,
    min_date: Option<String>,
    max_date: Option<String>,
) -> Result<()> {
    let settings = Settings::load()?;
    let window = DateWindow::new(
        parse_optional_date(min_date.as_deref())?,
        parse_optional_date(max_date.as_deref())?,
    );
    let token = load_token()?;

    let client = SlackWebClient::new(&settings.slack.api_base, &token);
    let options = TrackerOptions {
        support_handle: support_handle.trim_start_matches('@').to_string(),
        window,
        excluded_handles: settings.report.excluded_handles,
    };

    let count = export_support_requests(
        &client,
        &options,
        Path::new(output),
        Path::new(final_output),
        Some(&|message| println!("{}", message)),
    )?;

    println!(
        "Export completed successfully! {} support requests exported.",
        count
    );
    Ok(())
}

/// Run the tracker and write both the intermediate and the final report.
pub fn export_support_requests(
    api: &dyn ChatApi,
    options: &TrackerOptions,
    output: &Path,
    final_output: &Path,
    progress: Option<&dyn Fn(&str)>,
) -> Result<usize> {
    let rows = run_support_tracker(api, options, progress)?;

    if let Some(cb) = progress {
        cb(&format!("Saving csv to {}", output.display()));
    }
    write_intermediate_csv(output, &rows)?;

    if let Some(cb) = progress {
        cb(&format!("Saving csv to {}", final_output.display()));
    }
    let final_rows: Vec<FinalRow> = rows.iter().map(FinalRow::from).collect();
    write_final_csv(final_output, &final_rows)?;

    Ok(rows.len())
}

pub fn run_finalize(input: &str, output: &str) -> Result<()> {
    println!("Building {} from {}...", output, input);

    let rows = read_final_rows(Path::new(input))?;
    write_final_csv(Path::new(output), &rows)?;

    println!(
        "Export completed successfully! {} support requests exported.",
        rows.len()
    );
    Ok(())
}
