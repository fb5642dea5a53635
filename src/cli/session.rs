//! The interactive call loop: pick a read function, supply inputs, call,
//! record, repeat.

use alloy::json_abi::{Function, JsonAbi};

use super::prompt::Prompter;
use super::table::{render_pool_table, render_summary, render_value_table};
use crate::abis::{describe, input_label, input_names, is_pool_epoch_call, parse_uint, read_functions, ParamKind};
use crate::client::{FunctionCall, SelectedFunction};
use crate::error::Result;
use crate::models::{BatchSummary, PoolSet};
use crate::store::CsvAppender;
use crate::utils::{normalize_reward, NOT_AVAILABLE};
use crate::worker::{call_once, query_pools, query_values, CsvRecorder};

/// What to do after a function has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Next {
    SameFunction,
    SelectFunction,
    Quit,
}

pub struct Session<P, C> {
    prompter: P,
    caller: C,
    functions: Vec<Function>,
    pools: PoolSet,
    appender: CsvAppender,
}

impl<P: Prompter, C: FunctionCall> Session<P, C> {
    pub fn new(prompter: P, caller: C, abi: &JsonAbi, pools: PoolSet, appender: CsvAppender) -> Self {
        Self {
            prompter,
            caller,
            functions: read_functions(abi).into_iter().cloned().collect(),
            pools,
            appender,
        }
    }

    pub fn into_prompter(self) -> P {
        self.prompter
    }

    pub async fn run(&mut self) -> Result<()> {
        if self.functions.is_empty() {
            println!("No readable functions found in this contract");
            return Ok(());
        }

        'select: loop {
            let Some(index) = self.select_function()? else {
                break;
            };
            let function = self.functions[index].clone();
            println!("\nSelected: {}", function.name);

            loop {
                match self.run_function(&function).await? {
                    Next::SameFunction => continue,
                    Next::SelectFunction => continue 'select,
                    Next::Quit => break 'select,
                }
            }
        }

        println!("\nThank you for using the Contract Function Caller. Goodbye!");
        Ok(())
    }

    fn select_function(&mut self) -> Result<Option<usize>> {
        println!("\nAvailable read functions:");
        for (i, function) in self.functions.iter().enumerate() {
            println!("{}. {}", i + 1, describe(function));
        }

        loop {
            let Some(answer) = self.prompter.ask("\nSelect a function by number: ")? else {
                return Ok(None);
            };
            match answer.trim().parse::<usize>() {
                Ok(n) if (1..=self.functions.len()).contains(&n) => return Ok(Some(n - 1)),
                _ => println!("Invalid selection. Please try again."),
            }
        }
    }

    async fn run_function(&mut self, function: &Function) -> Result<Next> {
        let kinds = match function
            .inputs
            .iter()
            .map(ParamKind::from_param)
            .collect::<Result<Vec<_>>>()
        {
            Ok(kinds) => kinds,
            Err(e) => {
                println!("{e}");
                return Ok(Next::SelectFunction);
            }
        };

        let recorder = CsvRecorder::new(
            self.appender.clone(),
            function.name.clone(),
            input_names(function),
        );

        if is_pool_epoch_call(function) {
            return self.run_pools(function, kinds[1], &recorder).await;
        }

        if kinds.len() == 1 {
            match self
                .prompter
                .confirm("\nDo you want to process multiple values for this input? (y/n): ")?
            {
                None => return Ok(Next::Quit),
                Some(true) => return self.run_batch(function, kinds[0], &recorder).await,
                Some(false) => {}
            }
        }

        let mut inputs = Vec::with_capacity(kinds.len());
        for (i, kind) in kinds.iter().enumerate() {
            let question = format!(
                "Enter {} ({}){}: ",
                input_label(function, i),
                kind.type_name(),
                kind.hint()
            );
            let Some(value) = self.ask_valid(&question, |v| kind.coerce(v).is_ok())? else {
                return Ok(Next::Quit);
            };
            inputs.push(value);
        }

        self.run_single(function, &inputs, &recorder).await
    }

    async fn run_pools(&mut self, function: &Function, epoch_kind: ParamKind, recorder: &CsvRecorder) -> Result<Next> {
        println!("\nUsing predefined pool IDs:");
        for (i, pool) in self.pools.iter().enumerate() {
            println!("  {}. {}: {}", i + 1, pool.name, pool.id_hex());
        }

        let question = format!(
            "\nEnter {} ({}){} for all predefined pool IDs: ",
            input_label(function, 1),
            epoch_kind.type_name(),
            epoch_kind.hint()
        );
        let Some(raw_epoch) = self.ask_valid(&question, |v| {
            epoch_kind.coerce(v).is_ok() && parse_uint(v).is_ok()
        })?
        else {
            return Ok(Next::Quit);
        };
        let epoch = parse_uint(&raw_epoch)?;

        let source = SelectedFunction::new(&self.caller, function)?;
        match query_pools(&source, &self.pools, epoch, Some(recorder)).await {
            Ok(results) => {
                println!("\n{}", render_pool_table(&results));
                println!(
                    "{}",
                    render_summary("PROCESSING SUMMARY", &BatchSummary::from(results.as_slice()))
                );
                println!("Results saved to {}", recorder.appender().path().display());
            }
            Err(e) => println!("\nError processing pools: {e}"),
        }

        self.ask_another()
    }

    async fn run_batch(&mut self, function: &Function, kind: ParamKind, recorder: &CsvRecorder) -> Result<Next> {
        let question = format!(
            "\nEnter multiple values for {} ({}){}, separated by commas: ",
            input_label(function, 0),
            kind.type_name(),
            kind.hint()
        );

        let values = loop {
            let Some(answer) = self.prompter.ask(&question)? else {
                return Ok(Next::Quit);
            };
            let values: Vec<String> = answer
                .split(',')
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect();
            if values.is_empty() {
                println!("No values provided. Please try again.");
                continue;
            }
            let invalid: Vec<&str> = values
                .iter()
                .filter(|v| kind.coerce(v).is_err())
                .map(String::as_str)
                .collect();
            if !invalid.is_empty() {
                println!(
                    "Invalid values for type {}: {}\nPlease try again.",
                    kind.type_name(),
                    invalid.join(", ")
                );
                continue;
            }
            break values;
        };

        match query_values(&self.caller, function, &values, Some(recorder)).await {
            Ok(results) => {
                println!("\n{}", render_value_table(&results));
                println!(
                    "{}",
                    render_summary(
                        "BATCH PROCESSING SUMMARY",
                        &BatchSummary::from(results.as_slice())
                    )
                );
            }
            Err(e) => println!("\nError processing values: {e}"),
        }

        self.ask_another()
    }

    async fn run_single(&mut self, function: &Function, inputs: &[String], recorder: &CsvRecorder) -> Result<Next> {
        println!("\nCalling contract function {}...", function.name);

        match call_once(&self.caller, function, inputs, Some(recorder)).await {
            Ok(raw) => {
                println!("\nSuccess! Result: {raw}");
                println!("Result saved to {}", recorder.appender().path().display());
                let formatted = normalize_reward(&raw);
                if formatted != NOT_AVAILABLE {
                    println!("   Formatted result (÷ 1e18): {formatted}");
                }

                match self.ask_another()? {
                    Next::SelectFunction => {
                        match self.prompter.confirm("Call the same function again? (y/n): ")? {
                            Some(true) => Ok(Next::SameFunction),
                            Some(false) => Ok(Next::SelectFunction),
                            None => Ok(Next::Quit),
                        }
                    }
                    other => Ok(other),
                }
            }
            Err(e) => {
                println!("\nError calling contract: {e}");
                match self.prompter.confirm("\nDo you want to try again? (y/n): ")? {
                    Some(true) => Ok(Next::SameFunction),
                    Some(false) => Ok(Next::SelectFunction),
                    None => Ok(Next::Quit),
                }
            }
        }
    }

    fn ask_another(&mut self) -> Result<Next> {
        match self
            .prompter
            .confirm("\nDo you want to make another call? (y/n): ")?
        {
            Some(true) => Ok(Next::SelectFunction),
            _ => Ok(Next::Quit),
        }
    }

    /// Re-ask until `valid` accepts the answer; `None` on end of input.
    fn ask_valid(&mut self, question: &str, valid: impl Fn(&str) -> bool) -> Result<Option<String>> {
        loop {
            let Some(answer) = self.prompter.ask(question)? else {
                return Ok(None);
            };
            if valid(&answer) {
                return Ok(Some(answer.trim().to_string()));
            }
            println!("Invalid input. Please try again.");
        }
    }
}
