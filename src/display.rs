use colored::*;

/// Returns the dqp banner
pub fn get_logo() -> String {
    let logo = r#"
  ____   ___    ____
 |  _ \ / _ \  |  _ \
 | | | | | | | | |_) |
 | |_| | |_| | |  __/
 |____/ \__\_\ |_|
    "#;

    logo.to_string()
}

/// Returns a colored version of the banner
pub fn get_colored_logo() -> ColoredString {
    get_logo().bright_cyan()
}

/// Display version information with the banner
pub fn display_version() {
    println!("{}", get_colored_logo());
    println!("dqp version {}", env!("CARGO_PKG_VERSION"));
    println!("Bronze/silver/gold SQL runner with data-quality checks");
    println!("Repository: {}", env!("CARGO_PKG_REPOSITORY"));
}
