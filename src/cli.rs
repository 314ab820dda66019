use clap::ArgAction;
use tracing::{info, instrument};
use ubuntu_package_changelog::{
    Entries, Launchpad, Pocket, Ppa, RenderOptions, UbuntuCveTracker, annotate, render,
};

/// Consumer name this tool identifies itself with on Launchpad.
const CONSUMER: &str = "ubuntu-package-changelog";

/// Parse a pocket name from a string, case-insensitively.
///
/// This is a CLI boundary function; the library type is strict about the
/// known pocket names but not about their capitalisation.
fn parse_pocket(s: &str) -> Result<Pocket, String> {
    s.parse().map_err(|e| format!("{e}"))
}

/// Parse an `OWNER/NAME` PPA reference.
fn parse_ppa(s: &str) -> Result<Ppa, String> {
    s.parse().map_err(|e| format!("{e}"))
}

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Search the given PPA instead of the primary archive
    #[arg(long, value_name = "OWNER/NAME", value_parser = parse_ppa)]
    ppa: Option<Ppa>,

    /// Number of changelog entries to print; 0 means all
    #[arg(long, default_value_t = 1, value_name = "N")]
    entries: usize,

    /// Treat PACKAGE as a binary package name
    #[arg(long)]
    binary_package: bool,

    /// Architecture used to look up binary packages
    #[arg(long, default_value = "amd64", value_name = "ARCH")]
    binary_package_architecture: String,

    /// Fetch the changelog from changelogs.ubuntu.com instead of the
    /// Launchpad librarian
    #[arg(long)]
    use_changelogs_ubuntu_com: bool,

    /// Annotate each entry with the CVEs it references
    #[arg(long)]
    highlight_cves: bool,

    /// Print only entry headers and their CVE annotations
    #[arg(long)]
    highlight_cves_only: bool,

    /// Include CVE descriptions in the annotations
    #[arg(long)]
    highlight_cves_show_cve_description: bool,

    /// Launchpad identity to include in the consumer string
    #[arg(long, value_name = "NAME")]
    lp_user: Option<String>,

    /// The Ubuntu series, e.g. "20.04" or "focal"
    series: String,

    /// The pocket to search: Release, Security, Updates, Proposed or
    /// Backports
    #[arg(value_parser = parse_pocket)]
    pocket: Pocket,

    /// The package name
    package: String,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);
        self.print_changelog()
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }

    #[instrument(skip(self), fields(package = %self.package, series = %self.series))]
    fn print_changelog(self) -> anyhow::Result<()> {
        let consumer = self.lp_user.as_ref().map_or_else(
            || CONSUMER.to_string(),
            |user| format!("{CONSUMER} ({user})"),
        );
        let launchpad = Launchpad::anonymous(&consumer)?;

        // Binary package names are mapped to the source package they were
        // built from; the changelog always belongs to the source.
        let source_name = if self.binary_package {
            let Some(name) = launchpad.binary_source_name(
                &self.series,
                &self.binary_package_architecture,
                self.pocket,
                &self.package,
                self.ppa.as_ref(),
            )?
            else {
                println!("no changelog found");
                return Ok(());
            };
            name
        } else {
            self.package.clone()
        };

        let Some(publication) = launchpad.source_publication(
            &self.series,
            self.pocket,
            &source_name,
            self.ppa.as_ref(),
        )?
        else {
            println!("no changelog found");
            return Ok(());
        };

        let changelog_url = if self.use_changelogs_ubuntu_com {
            Some(publication.pool_changelog_url())
        } else {
            launchpad.changelog_url(&publication)?
        };
        let Some(changelog_url) = changelog_url else {
            println!("no changelog found");
            return Ok(());
        };

        info!(url = %changelog_url, "downloading changelog");
        let Some(text) = launchpad.fetch_changelog(&changelog_url)? else {
            println!("no changelog found");
            return Ok(());
        };

        let options = RenderOptions {
            max_entries: self.entries,
            highlight_cves: self.highlight_cves,
            cves_only: self.highlight_cves_only,
            show_cve_description: self.highlight_cves_show_cve_description,
        };

        let tracker = if options.annotate() {
            Some(UbuntuCveTracker::new()?)
        } else {
            None
        };

        // Entries are rendered and printed as they are parsed; output that
        // has been printed stays printed if a later CVE fetch fails.
        for mut entry in Entries::new(&text, &source_name, options.max_entries) {
            if let Some(tracker) = &tracker {
                annotate(&mut entry, tracker, options.show_cve_description)?;
            }
            for line in render(&entry, &source_name, &options) {
                println!("{line}");
            }
        }

        Ok(())
    }
}
