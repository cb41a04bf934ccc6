use clap::{Parser, Subcommand};

/// This is an immunization record tracking program for community health
/// workers.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (directory path) The directory holding the record store. Created on
    /// first use.
    #[clap(short, long, value_parser, default_value = "vaxtrack_data")]
    pub data_dir: String,

    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Starts a session. The selections required depend on the role: BHW
    /// sessions need a barangay and a sitio, BNS sessions need a barangay,
    /// MHO sessions need neither.
    Login {
        /// BHW (barangay health worker), BNS (barangay nutrition scholar) or
        /// MHO (municipal health officer).
        #[clap(long, value_parser)]
        role: String,
        #[clap(long, value_parser)]
        email: String,
        #[clap(long, value_parser)]
        barangay: Option<String>,
        #[clap(long, value_parser)]
        sitio: Option<String>,
    },

    /// Imports records from a spreadsheet, replacing the session's stored
    /// list. Requires a BHW session.
    Import {
        /// (file path) The file to import.
        #[clap(value_parser)]
        file: String,
        /// (default inferred from the file extension) The type of the input:
        /// csv or xlsx.
        #[clap(long, value_parser)]
        input_type: Option<String>,
    },

    /// Prints the records visible to the session as a table.
    List,

    /// Appends one record to the session's list. Requires a BHW session.
    Add {
        #[clap(long, value_parser)]
        child: String,
        #[clap(long, value_parser, default_value_t = 0)]
        age: u32,
        #[clap(long, value_parser, default_value = "")]
        parent: String,
        /// (default: the session's barangay)
        #[clap(long, value_parser)]
        barangay: Option<String>,
        /// (default: the session's sitio)
        #[clap(long, value_parser)]
        sitio: Option<String>,
        #[clap(long, value_parser, default_value = "")]
        bcg: String,
        #[clap(long, value_parser, default_value = "")]
        opv: String,
        #[clap(long, value_parser, default_value = "")]
        pentavalent: String,
        #[clap(long, value_parser, default_value = "")]
        measles: String,
    },

    /// Updates the named fields of the record at a position. Requires a BHW
    /// session.
    Edit {
        /// The position of the record, as shown by list.
        #[clap(value_parser)]
        index: usize,
        #[clap(long, value_parser)]
        child: Option<String>,
        #[clap(long, value_parser)]
        age: Option<u32>,
        #[clap(long, value_parser)]
        parent: Option<String>,
        #[clap(long, value_parser)]
        barangay: Option<String>,
        #[clap(long, value_parser)]
        sitio: Option<String>,
        #[clap(long, value_parser)]
        bcg: Option<String>,
        #[clap(long, value_parser)]
        opv: Option<String>,
        #[clap(long, value_parser)]
        pentavalent: Option<String>,
        #[clap(long, value_parser)]
        measles: Option<String>,
    },

    /// Deletes the record at a position. Requires a BHW session.
    Delete {
        #[clap(value_parser)]
        index: usize,
    },

    /// Removes every record stored for the session's barangay and sitio.
    /// Requires a BHW session.
    Clear,

    /// Writes the records visible to the session to a file.
    Export {
        /// csv, or xls for the legacy spreadsheet format.
        #[clap(long, value_parser, default_value = "csv")]
        format: String,
        /// (file path or empty) Where to write. Defaults to a name derived
        /// from the session's scope.
        #[clap(short, long, value_parser)]
        out: Option<String>,
    },

    /// Prints coverage statistics for the records visible to the session in
    /// JSON format.
    Stats {
        /// (file path, 'stdout' or empty) If specified, the summary will be
        /// written to the given location instead of the standard output.
        #[clap(short, long, value_parser)]
        out: Option<String>,
        /// (file path) A reference summary in JSON format. If provided,
        /// vaxtrack will check that the computed summary matches the
        /// reference.
        #[clap(short, long, value_parser)]
        reference: Option<String>,
    },

    /// Renders the coverage charts for the records visible to the session.
    Charts {
        /// (directory path) Where the chart images are written.
        #[clap(long, value_parser, default_value = ".")]
        out_dir: String,
    },
}
