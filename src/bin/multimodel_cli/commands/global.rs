use anyhow::{bail, Result};
use multimodel::{Connection, DriverError, GlobalRef};

use crate::context::Context;

fn parse(global: &str) -> Result<GlobalRef> {
    Ok(global.parse::<GlobalRef>()?)
}

/// Set the value of a node
pub fn set(context: &Context, global: &str, value: &str) -> Result<()> {
    let global = parse(global)?;
    let mut connection = context.connect()?;

    connection.set_path(&global.name, &global.path, value)?;
    println!("{}", context.formatter().format_value(&global, value)?);

    connection.close()?;
    Ok(())
}

/// Print the value of a node
pub fn get(context: &Context, global: &str) -> Result<()> {
    let global = parse(global)?;
    let mut connection = context.connect()?;

    match connection.get_path(&global.name, &global.path) {
        Ok(value) => println!("{}", context.formatter().format_value(&global, &value)?),
        Err(DriverError::NotFound(missing)) => bail!("Undefined node {}", missing),
        Err(e) => return Err(e.into()),
    }

    connection.close()?;
    Ok(())
}

/// Print the definition state of a node
pub fn defined(context: &Context, global: &str) -> Result<()> {
    let global = parse(global)?;
    let mut connection = context.connect()?;

    let state = connection.is_path_defined(&global.name, &global.path)?;
    println!("{}", context.formatter().format_definition(&global, state)?);

    connection.close()?;
    Ok(())
}

/// List the subscripts directly below a node
pub fn children(context: &Context, global: &str) -> Result<()> {
    let global = parse(global)?;
    let mut connection = context.connect()?;

    let children = connection.children(&global.name, &global.path)?;
    println!("{}", context.formatter().format_children(&global, &children)?);

    connection.close()?;
    Ok(())
}

/// List the globals of the namespace
pub fn list(context: &Context) -> Result<()> {
    let mut connection = context.connect()?;

    let names = connection.globals()?;
    println!("{}", context.formatter().format_globals(context.namespace(), &names)?);

    connection.close()?;
    Ok(())
}

/// Remove a node and its subtree
pub fn kill(context: &Context, global: &str) -> Result<()> {
    let global = parse(global)?;
    let mut connection = context.connect()?;

    let removed = connection.kill_path(&global.name, &global.path)?;
    println!(
        "{}",
        context.formatter().format_success(&format!("Removed {} node(s) at {}", removed, global))
    );

    connection.close()?;
    Ok(())
}
