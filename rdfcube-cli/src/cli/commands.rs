//! Command implementations and argument parsing for the rdfcube CLI.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand};
use rdfcube_core::{
    Cube, CubeBuilder, CubeDescription, CubeError, DescriptionError, Table,
};
use rdfcube_frictionless::{
    Conversion, ConvertOptions, DEFAULT_BASE_URI, FrictionlessError, convert_from_url,
};
use rdfcube_providers_csv::{CsvOptions, CsvTable, CsvTableError};
use thiserror::Error;
use tracing::{Span, debug, field, info, instrument};

const DATA_FILE: &str = "data.csv";

/// Description files in lookup order; the first one present wins.
const DESCRIPTION_FILES: [&str; 2] = ["description.yml", "description.json"];

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(name = "rdfcube", about = "Cube data operations.")]
pub struct Cli {
    /// Operation to perform.
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Number of `-v` flags given to the selected command.
    #[must_use]
    pub const fn verbosity(&self) -> u8 {
        match &self.command {
            Command::Serialize(args) => args.verbose,
            Command::Frictionless(args) => args.verbose,
        }
    }
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Serialize cube data to Turtle.
    Serialize(SerializeArgs),
    /// Convert a frictionless data package into a cube directory.
    Frictionless(FrictionlessArgs),
}

/// Options accepted by the `serialize` command.
#[derive(Debug, Args, Clone)]
pub struct SerializeArgs {
    /// Directory containing `data.csv` and `description.yml` or
    /// `description.json`.
    pub input_directory: PathBuf,

    /// Output Turtle file.
    pub output_ttl: PathBuf,

    /// Additional values to treat as missing.
    #[arg(long = "na_value", value_name = "V", num_args = 1..)]
    pub na_values: Vec<String>,

    /// Field separator of the CSV file.
    #[arg(long, default_value_t = ',')]
    pub sep: char,

    /// Decimal marker of numeric CSV cells.
    #[arg(long, default_value_t = '.')]
    pub decimal: char,

    /// Increase verbosity.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Options accepted by the `frictionless` command.
#[derive(Debug, Args, Clone)]
pub struct FrictionlessArgs {
    /// URL of the data package or of its `datapackage.json`.
    pub input_url: String,

    /// Directory to save the output files to.
    pub output: PathBuf,

    /// Base IRI written into the generated description.
    #[arg(long = "base-uri", default_value = DEFAULT_BASE_URI)]
    pub base_uri: String,

    /// Increase verbosity.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// The input directory holds neither description file.
    #[error("neither description.yml nor description.json found in `{directory}`")]
    DescriptionNotFound {
        /// Directory that was searched.
        directory: PathBuf,
    },
    /// Probing an input path failed.
    #[error("failed to inspect `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The description could not be loaded.
    #[error(transparent)]
    Description(#[from] DescriptionError),
    /// The CSV file could not be loaded.
    #[error(transparent)]
    Csv(#[from] CsvTableError),
    /// Building or writing the cube failed.
    #[error(transparent)]
    Cube(#[from] CubeError),
    /// Converting the data package failed.
    #[error(transparent)]
    Frictionless(#[from] FrictionlessError),
}

impl CliError {
    /// Stable code of the underlying library error, when it has one.
    #[must_use]
    pub const fn code(&self) -> Option<&'static str> {
        match self {
            Self::Description(error) => Some(error.code().as_str()),
            Self::Cube(error) => Some(error.code().as_str()),
            _ => None,
        }
    }

    /// Code of the description or table error nested in a cube error.
    #[must_use]
    pub fn detail_code(&self) -> Option<&'static str> {
        match self {
            Self::Cube(error) => error
                .description_code()
                .map(|code| code.as_str())
                .or_else(|| error.table_code().map(|code| code.as_str())),
            _ => None,
        }
    }
}

/// Outcome of a successful command.
#[derive(Debug)]
pub enum ExecutionSummary {
    /// A cube was written to `output`.
    Serialized {
        /// Turtle file that was written.
        output: PathBuf,
        /// The finished cube.
        cube: Box<Cube<CsvTable>>,
    },
    /// A data package was converted.
    Converted(Conversion),
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when loading, building or writing fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use rdfcube_cli::cli::{Cli, Command, ExecutionSummary, SerializeArgs, run_cli};
/// # use rdfcube_test_support::fixtures::{DescriptionFiles, write_cube_directory};
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let dir = tempfile::tempdir()?;
/// let input = write_cube_directory(&dir.path().join("rain"), DescriptionFiles::Yaml)?;
/// let output = dir.path().join("rain.ttl");
/// let cli = Cli {
///     command: Command::Serialize(SerializeArgs {
///         input_directory: input,
///         output_ttl: output.clone(),
///         na_values: Vec::new(),
///         sep: ',',
///         decimal: '.',
///         verbose: 0,
///     }),
/// };
/// let summary = run_cli(cli)?;
/// assert!(matches!(summary, ExecutionSummary::Serialized { .. }));
/// assert!(output.exists());
/// # Ok(())
/// # }
/// ```
#[instrument(
    name = "cli.run",
    err,
    skip(cli),
    fields(command = field::Empty),
)]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    let span = Span::current();
    match cli.command {
        Command::Serialize(args) => {
            span.record("command", field::display("serialize"));
            run_serialize(args)
        }
        Command::Frictionless(args) => {
            span.record("command", field::display("frictionless"));
            run_frictionless(args)
        }
    }
}

/// Returns the description file of `directory`, preferring
/// `description.yml` over `description.json`.
///
/// # Errors
/// Returns [`CliError::DescriptionNotFound`] when neither exists and
/// [`CliError::Io`] when a candidate cannot be checked.
pub fn description_path(directory: &Path) -> Result<PathBuf, CliError> {
    for name in DESCRIPTION_FILES {
        let candidate = directory.join(name);
        let exists = candidate.try_exists().map_err(|source| CliError::Io {
            path: candidate.clone(),
            source,
        })?;
        if exists {
            return Ok(candidate);
        }
    }
    Err(CliError::DescriptionNotFound {
        directory: directory.to_path_buf(),
    })
}

#[instrument(
    name = "cli.serialize",
    err,
    skip(args),
    fields(input = field::Empty, output = field::Empty, description = field::Empty),
)]
pub(super) fn run_serialize(args: SerializeArgs) -> Result<ExecutionSummary, CliError> {
    let SerializeArgs {
        input_directory,
        output_ttl,
        na_values,
        sep,
        decimal,
        ..
    } = args;
    let span = Span::current();
    span.record("input", field::display(input_directory.display()));
    span.record("output", field::display(output_ttl.display()));

    let description_file = description_path(&input_directory)?;
    span.record("description", field::display(description_file.display()));
    let description = CubeDescription::from_path(&description_file)?;

    let options = CsvOptions::new()
        .with_separator(sep)
        .with_decimal(decimal)
        .with_na_values(na_values);
    let table = CsvTable::from_path(&input_directory.join(DATA_FILE), &options)?;
    debug!(
        rows = table.row_count(),
        columns = table.columns().len(),
        "data loaded"
    );

    let mut cube = CubeBuilder::new().build(table, description)?;
    cube.prepare_data()?;
    cube.write_cube()?;
    cube.write_observations()?;
    cube.write_shape()?;
    cube.serialize(&output_ttl)?;

    info!(
        cube = cube.iris().cube.as_str(),
        triples = cube.graph().len(),
        "command completed"
    );
    Ok(ExecutionSummary::Serialized {
        output: output_ttl,
        cube: Box::new(cube),
    })
}

#[instrument(
    name = "cli.frictionless",
    err,
    skip(args),
    fields(url = field::Empty, output = field::Empty),
)]
pub(super) fn run_frictionless(args: FrictionlessArgs) -> Result<ExecutionSummary, CliError> {
    let FrictionlessArgs {
        input_url,
        output,
        base_uri,
        ..
    } = args;
    let span = Span::current();
    span.record("url", field::display(&input_url));
    span.record("output", field::display(output.display()));

    let options = ConvertOptions::default().with_base_uri(base_uri);
    let conversion = convert_from_url(&input_url, &output, &options)?;
    info!(rows = conversion.rows, "command completed");
    Ok(ExecutionSummary::Converted(conversion))
}

/// Renders `summary` to `writer` in a human-readable text format.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    match summary {
        ExecutionSummary::Serialized { output, cube } => {
            writeln!(writer, "{cube}")?;
            writeln!(writer, "  output: {}", output.display())?;
        }
        ExecutionSummary::Converted(conversion) => {
            writeln!(writer, "data: {}", conversion.data_path.display())?;
            writeln!(
                writer,
                "description: {}",
                conversion.description_path.display()
            )?;
            writeln!(writer, "rows: {}", conversion.rows)?;
        }
    }
    Ok(())
}
