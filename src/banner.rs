//! Banner for the stratgen CLI

use console::{style, Term};

/// Display the stratgen banner on stderr
pub fn display_banner() {
    let term = Term::stderr();
    let version = env!("CARGO_PKG_VERSION");

    let banner = format!(
        r#"
 ____  _             _
/ ___|| |_ _ __ __ _| |_ __ _  ___ _ __
\___ \| __| '__/ _` | __/ _` |/ _ \ '_ \
 ___) | |_| | | (_| | || (_| |  __/ | | |
|____/ \__|_|  \__,_|\__\__, |\___|_| |_|
                        |___/
        QuantConnect strategy generator v{}
"#,
        version
    );

    let _ = term.write_line(&style(banner).cyan().to_string());
    let _ = term.write_line(&style("=".repeat(60)).dim().to_string());
}

/// One-line banner
pub fn display_minimal_banner() {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!(
        "{}",
        style(format!("stratgen v{} - QuantConnect strategy generator", version))
            .cyan()
            .bold()
    );
}
