use clap::Parser;

/// The window, geometry and shaders are fixed, so there is nothing to configure
/// beyond `--help` and `--version`.
#[derive(Parser, Debug)]
#[command(
    name = "hello-triangle",
    version,
    about = "Open a 640x480 window and render one static triangle"
)]
pub struct Cli {}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn rejects_operational_arguments() {
        assert!(Cli::try_parse_from(["hello-triangle"]).is_ok());
        assert!(Cli::try_parse_from(["hello-triangle", "--size", "800x600"]).is_err());
        assert!(Cli::try_parse_from(["hello-triangle", "shader.glsl"]).is_err());
    }
}
