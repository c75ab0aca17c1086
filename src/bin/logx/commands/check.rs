// Check command implementation

use anyhow::Result;
use logx::LogConfig;

/// Execute the check command
pub fn execute_check(config: &LogConfig) -> Result<()> {
    config.check()?;

    let (output, err_output) = config.destinations();
    println!("{}", serde_yaml::to_string(config)?);
    println!("Output:        {}", output.join(", "));
    println!("Err Output:    {}", err_output.join(", "));
    match config.stack_level() {
        Some(level) => println!("Stacktrace:    >= {}", level),
        None => println!("Stacktrace:    disabled"),
    }
    println!(
        "Sampling:      {}",
        if config.sampling.is_some() { "enabled" } else { "disabled" }
    );

    Ok(())
}
