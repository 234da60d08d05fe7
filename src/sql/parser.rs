//! Parser for SQL
//!
//! This module turns a SELECT string into its AST.

use pest::Parser;
use pest_derive::Parser;
use pest::iterators::Pair;

use crate::core::errors::{DriverError, DriverResult};
use crate::sql::ast::{Condition, OrderBy, Projection, Select};

#[derive(Parser)]
#[grammar = "sql/grammar.pest"]
pub struct SqlParser;

pub fn parse_select(input: &str) -> DriverResult<Select> {
    let mut pairs = SqlParser::parse(Rule::main, input)
        .map_err(|e| DriverError::Query(format!("Parse error: {}", e)))?;

    let statement = pairs
        .next()
        .and_then(|main| main.into_inner().find(|p| p.as_rule() == Rule::select_stmt))
        .ok_or_else(|| DriverError::Query("Empty query".to_string()))?;

    parse_select_stmt(statement)
}

fn parse_select_stmt(pair: Pair<Rule>) -> DriverResult<Select> {
    let mut projection = Projection::All;
    let mut table = String::new();
    let mut filters = Vec::new();
    let mut order = None;

    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::projection => projection = parse_projection(part)?,
            Rule::table_name => table = part.as_str().to_string(),
            Rule::where_clause => {
                for condition in part.into_inner() {
                    filters.push(parse_condition(condition)?);
                }
            }
            Rule::order_clause => order = Some(parse_order(part)?),
            _ => {}
        }
    }

    Ok(Select { projection, table, filters, order })
}

fn parse_projection(pair: Pair<Rule>) -> DriverResult<Projection> {
    let inner = pair
        .into_inner()
        .next()
        .ok_or_else(|| DriverError::Query("Missing select list".to_string()))?;

    match inner.as_rule() {
        Rule::star => Ok(Projection::All),
        Rule::column_list => Ok(Projection::Columns(
            inner.into_inner().map(|c| c.as_str().to_string()).collect(),
        )),
        other => Err(DriverError::Query(format!("Unexpected select list: {:?}", other))),
    }
}

fn parse_condition(pair: Pair<Rule>) -> DriverResult<Condition> {
    let mut inner = pair.into_inner();
    let (Some(column), Some(literal)) = (inner.next(), inner.next()) else {
        return Err(DriverError::Query("Incomplete condition".to_string()));
    };

    Ok(Condition {
        column: column.as_str().to_string(),
        value: parse_literal(literal)?,
    })
}

fn parse_literal(pair: Pair<Rule>) -> DriverResult<String> {
    let inner = pair
        .into_inner()
        .next()
        .ok_or_else(|| DriverError::Query("Missing literal".to_string()))?;

    match inner.as_rule() {
        Rule::string => {
            let s = inner.as_str();
            Ok(s[1..s.len() - 1].replace("''", "'"))
        }
        Rule::number => Ok(inner.as_str().to_string()),
        other => Err(DriverError::Query(format!("Unexpected literal type: {:?}", other))),
    }
}

fn parse_order(pair: Pair<Rule>) -> DriverResult<OrderBy> {
    let mut inner = pair.into_inner();
    let column = inner
        .next()
        .ok_or_else(|| DriverError::Query("Missing ORDER BY column".to_string()))?;
    let descending = inner
        .next()
        .map_or(false, |direction| direction.as_str().eq_ignore_ascii_case("desc"));

    Ok(OrderBy { column: column.as_str().to_string(), descending })
}
