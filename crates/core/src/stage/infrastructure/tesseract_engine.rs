use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use crate::shared::constants::TESSERACT_BINARY;
use crate::stage::domain::ocr_engine::{OcrEngine, OcrMode, OcrOptions};

/// Page segmentation mode for a single text line.
const PSM_SINGLE_LINE: &str = "7";
/// Page segmentation mode for one uniform block of text.
const PSM_UNIFORM_BLOCK: &str = "6";

#[derive(Clone, Debug)]
pub struct TesseractEngine {
    binary: OsString,
}

impl TesseractEngine {
    pub fn new(binary: impl Into<OsString>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new(TESSERACT_BINARY)
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(&self, frame: &Path, options: &OcrOptions) -> Command {
        let psm = match options.mode() {
            OcrMode::Fast => PSM_SINGLE_LINE,
            OcrMode::Accurate => PSM_UNIFORM_BLOCK,
        };
        let mut command = Command::new(&self.binary);
        command
            .arg(frame)
            .arg("stdout")
            .arg("-l")
            .arg(options.language_arg())
            .arg("--psm")
            .arg(psm);
        command
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::fast(OcrMode::Fast, "7")]
    #[case::accurate(OcrMode::Accurate, "6")]
    fn test_recognize_arguments(#[case] mode: OcrMode, #[case] psm: &str) {
        let options = OcrOptions::new("eng+jpn", mode).unwrap();
        let command = TesseractEngine::default().recognize(Path::new("/f/000001.png"), &options);
        let args: Vec<_> = command
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(command.get_program(), "tesseract");
        assert_eq!(
            args,
            ["/f/000001.png", "stdout", "-l", "eng+jpn", "--psm", psm]
        );
    }
}
