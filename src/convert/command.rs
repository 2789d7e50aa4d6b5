use super::Converter;
use crate::error::ConvertError;
use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};
use std::thread;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tool {
    RsvgConvert,
    CairoSvg,
}

/// Converter that pipes the SVG through an external program
#[derive(Debug, Clone)]
pub struct CommandConverter {
    tool: Tool,
}

impl CommandConverter {
    pub fn rsvg_convert() -> Self {
        Self {
            tool: Tool::RsvgConvert,
        }
    }

    pub fn cairosvg() -> Self {
        Self {
            tool: Tool::CairoSvg,
        }
    }

    fn program(&self) -> &'static str {
        match self.tool {
            Tool::RsvgConvert => "rsvg-convert",
            Tool::CairoSvg => "cairosvg",
        }
    }

    fn png_args(&self, scale: f32) -> Vec<String> {
        let scale = scale.to_string();
        let args: Vec<&str> = match self.tool {
            Tool::RsvgConvert => vec!["-f", "png", "-z", &scale, "-b", "white"],
            Tool::CairoSvg => vec!["-", "-f", "png", "-s", &scale, "-b", "white", "-o", "-"],
        };
        args.into_iter().map(String::from).collect()
    }

    fn pdf_args(&self) -> Vec<String> {
        let args: &[&str] = match self.tool {
            Tool::RsvgConvert => &["-f", "pdf"],
            Tool::CairoSvg => &["-", "-f", "pdf", "-o", "-"],
        };
        args.iter().map(|s| s.to_string()).collect()
    }

    /// Run the program with `svg` on stdin and return its stdout
    fn run(&self, args: &[String], svg: &str) -> Result<Vec<u8>, ConvertError> {
        let name = self.program();
        let mut child = Command::new(name)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => ConvertError::Unavailable {
                    backend: name,
                    reason: "not found on PATH".to_string(),
                },
                _ => ConvertError::Unavailable {
                    backend: name,
                    reason: e.to_string(),
                },
            })?;

        // Stdin is fed from a thread while stdout is drained
        let writer = child.stdin.take().map(|mut stdin| {
            let input = svg.as_bytes().to_vec();
            thread::spawn(move || stdin.write_all(&input))
        });

        let output = child.wait_with_output().map_err(|e| ConvertError::Failed {
            backend: name,
            message: e.to_string(),
        })?;

        if let Some(handle) = writer
            && let Ok(Err(e)) = handle.join()
            && output.status.success()
        {
            return Err(ConvertError::Failed {
                backend: name,
                message: format!("writing input: {}", e),
            });
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ConvertError::Failed {
                backend: name,
                message: format!("{} ({})", stderr.trim(), output.status),
            });
        }
        if output.stdout.is_empty() {
            return Err(ConvertError::Failed {
                backend: name,
                message: "produced no output".to_string(),
            });
        }
        Ok(output.stdout)
    }
}

impl Converter for CommandConverter {
    fn name(&self) -> &'static str {
        self.program()
    }

    fn to_pdf(&self, svg: &str) -> Result<Vec<u8>, ConvertError> {
        self.run(&self.pdf_args(), svg)
    }

    fn to_png(&self, svg: &str, scale: f32) -> Result<Vec<u8>, ConvertError> {
        self.run(&self.png_args(scale), svg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rsvg_convert_args() {
        let c = CommandConverter::rsvg_convert();
        assert_eq!(c.name(), "rsvg-convert");
        assert_eq!(c.png_args(2.0), ["-f", "png", "-z", "2", "-b", "white"]);
        assert_eq!(c.pdf_args(), ["-f", "pdf"]);
    }

    #[test]
    fn test_cairosvg_args() {
        let c = CommandConverter::cairosvg();
        assert_eq!(c.name(), "cairosvg");
        assert_eq!(
            c.png_args(1.5),
            ["-", "-f", "png", "-s", "1.5", "-b", "white", "-o", "-"]
        );
        assert_eq!(c.pdf_args(), ["-", "-f", "pdf", "-o", "-"]);
    }

    #[test]
    fn test_bad_invocation_is_error() {
        let c = CommandConverter {
            tool: Tool::RsvgConvert,
        };
        let err = c
            .run(&["--definitely-not-a-flag".to_string()], "<svg/>")
            .err();
        // Either the tool is missing or it rejects the flag; both are errors
        assert!(matches!(
            err,
            Some(ConvertError::Unavailable { .. }) | Some(ConvertError::Failed { .. })
        ));
    }
}
