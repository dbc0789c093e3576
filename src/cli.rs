use clap::Parser;

/// Command-line arguments for formvis
#[derive(Clone, Parser, Debug, Default)]
#[command(
    name = "formvis",
    version,
    about = "Conditional search and report forms in the terminal"
)]
pub struct Args {
    /// Form to open: "reservations", "report", or a form defined in config.toml
    #[arg(long = "form", short = 'f')]
    pub form: Option<String>,

    /// Initial state as a query string or URL, e.g. "searchByDay=range&dayFrom=2024-01-01"
    #[arg(long = "query", short = 'q')]
    pub query: Option<String>,

    /// Print the resolved form state as JSON and exit
    #[arg(long = "print-state", action)]
    pub print_state: bool,

    /// List the available forms and exit
    #[arg(long = "list-forms", action)]
    pub list_forms: bool,

    /// Enable debug mode to show operational information
    #[arg(long = "debug", action)]
    pub debug: bool,

    /// Write the default configuration file and exit
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Overwrite an existing configuration file (with --generate-config)
    #[arg(long = "force", action, requires = "generate_config")]
    pub force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_form_and_query() {
        let args = Args::parse_from([
            "formvis",
            "--form",
            "report",
            "-q",
            "reportPeriod=yearly",
            "--print-state",
        ]);
        assert_eq!(args.form.as_deref(), Some("report"));
        assert_eq!(args.query.as_deref(), Some("reportPeriod=yearly"));
        assert!(args.print_state);
        assert!(!args.debug);
    }

    #[test]
    fn test_force_requires_generate_config() {
        assert!(Args::try_parse_from(["formvis", "--force"]).is_err());
        assert!(Args::try_parse_from(["formvis", "--generate-config", "--force"]).is_ok());
    }
}
