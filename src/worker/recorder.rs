use crate::error::Result;
use crate::store::{CsvAppender, CsvRecord};

/// Writes the results of one selected function to the CSV log.
#[derive(Debug, Clone)]
pub struct CsvRecorder {
    appender: CsvAppender,
    function_name: String,
    input_names: Vec<String>,
}

impl CsvRecorder {
    pub fn new(
        appender: CsvAppender,
        function_name: impl Into<String>,
        input_names: Vec<String>,
    ) -> Self {
        Self {
            appender,
            function_name: function_name.into(),
            input_names,
        }
    }

    pub fn appender(&self) -> &CsvAppender {
        &self.appender
    }

    pub fn record(&self, inputs: &[String], raw_result: &str, pool_name: Option<&str>) -> Result<()> {
        self.appender.append(&CsvRecord {
            function_name: &self.function_name,
            input_names: &self.input_names,
            input_values: inputs,
            raw_result,
            pool_name,
        })
    }
}
