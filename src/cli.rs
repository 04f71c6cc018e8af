//! Command-line front end over the catalog core.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};

use crate::app::AppContext;
use crate::catalog::queries::load;
use crate::catalog::workflow::{
    begin_delete, begin_edit, created_message, deleted_message, updated_message,
};
use crate::catalog::{
    confirm_delete, submit_form, DeleteOutcome, Product, ProductCategory, SubmitOutcome,
    UpdateProduct,
};
use crate::format::{format_currency, format_date, format_relative_time};
use crate::storage::CURRENCY_KEY;
use crate::ui::form::{FieldErrors, FormField, FormStore};
use crate::ui::selection::SelectionStore;

#[derive(Parser, Debug)]
#[command(name = "orderme", author, version, about = "Manage the OrderMe product catalog")]
pub struct Cli {
    /// Config file (default: platform config dir/orderme/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// API base URL, overrides config and ORDERME_API_URL
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List products
    List {
        /// Only featured products
        #[arg(long)]
        featured: bool,
        /// Only products of this category
        #[arg(long, conflicts_with = "featured")]
        category: Option<ProductCategory>,
    },
    /// Show one product
    Show { id: String },
    /// Create a product
    Create(FieldArgs),
    /// Edit a product; unspecified fields keep their value
    Update {
        id: String,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Delete a product
    Delete { id: String },
    /// Show or change display preferences
    Prefs {
        /// Currency code used for prices, e.g. USD, EUR
        #[arg(long)]
        currency: Option<String>,
    },
    /// List product categories
    Categories,
}

/// Form fields settable from the command line.
#[derive(Args, Debug, Default, Clone)]
pub struct FieldArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub price: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub image_url: Option<String>,
    #[arg(long, conflicts_with = "unavailable")]
    pub available: bool,
    #[arg(long)]
    pub unavailable: bool,
}

impl FieldArgs {
    /// Types every given value into the form.
    pub fn apply(&self, form: &FormStore) {
        let text_fields = [
            (FormField::Name, &self.name),
            (FormField::Description, &self.description),
            (FormField::Price, &self.price),
            (FormField::Category, &self.category),
            (FormField::ImageUrl, &self.image_url),
        ];
        for (field, value) in text_fields {
            if let Some(value) = value {
                form.update_field(field, value.as_str());
            }
        }
        if self.available {
            form.update_field(FormField::IsAvailable, true);
        }
        if self.unavailable {
            form.update_field(FormField::IsAvailable, false);
        }
    }
}

pub async fn run<W: Write>(command: Command, app: &AppContext, out: &mut W) -> Result<()> {
    match command {
        Command::List { featured, category } => list(app, featured, category, out).await,
        Command::Show { id } => show(app, &id, out).await,
        Command::Create(fields) => create(app, &fields, out).await,
        Command::Update { id, fields } => update(app, &id, &fields, out).await,
        Command::Delete { id } => delete(app, &id, out).await,
        Command::Prefs { currency } => prefs(app, currency, out),
        Command::Categories => categories(out),
    }
}

async fn list<W: Write>(
    app: &AppContext,
    featured: bool,
    category: Option<ProductCategory>,
    out: &mut W,
) -> Result<()> {
    let catalog = app.catalog();
    let mut subscription = match (featured, category) {
        (true, _) => catalog.featured(),
        (false, Some(category)) => catalog.by_category(category),
        (false, None) => catalog.products(),
    };
    let products = load(&mut subscription)
        .await
        .context("Error loading products")?;

    if products.is_empty() {
        writeln!(out, "No products found.")?;
        return Ok(());
    }
    write_table(out, &products, &app.currency())?;
    writeln!(out, "\n{} product(s)", products.len())?;
    Ok(())
}

async fn show<W: Write>(app: &AppContext, id: &str, out: &mut W) -> Result<()> {
    let product = fetch_product(app, id).await?;
    let currency = app.currency();
    let now = Utc::now();

    writeln!(out, "{} (#{})", product.name, product.id)?;
    writeln!(out, "  {}", product.description)?;
    writeln!(out, "  Category:  {}", product.category.label())?;
    writeln!(out, "  Price:     {}", format_currency(product.price, &currency))?;
    writeln!(out, "  Status:    {}", product.availability_label())?;
    if let Some(url) = &product.image_url {
        writeln!(out, "  Image:     {}", url)?;
    }
    for (label, timestamp) in [("Created", &product.created_at), ("Updated", &product.updated_at)] {
        let Some(timestamp) = timestamp else { continue };
        if let (Some(date), Some(relative)) =
            (format_date(timestamp), format_relative_time(timestamp, now))
        {
            writeln!(out, "  {}:   {} ({})", label, date, relative)?;
        }
    }
    Ok(())
}

async fn create<W: Write>(app: &AppContext, fields: &FieldArgs, out: &mut W) -> Result<()> {
    let form = FormStore::new();
    fields.apply(&form);
    let mutation = app.catalog().create_product();

    match submit_form(&form, &mutation, |payload| payload).await {
        SubmitOutcome::Saved(product) => {
            writeln!(out, "{}", created_message(&product))?;
            Ok(())
        }
        SubmitOutcome::Invalid(errors) => invalid(out, &errors),
        SubmitOutcome::Failed(error) => Err(anyhow!(error).context("Error creating product")),
    }
}

async fn update<W: Write>(
    app: &AppContext,
    id: &str,
    fields: &FieldArgs,
    out: &mut W,
) -> Result<()> {
    let product = fetch_product(app, id).await?;
    let form = FormStore::new();
    let selection = SelectionStore::new();
    begin_edit(&form, &selection, product);
    fields.apply(&form);

    let mutation = app.catalog().update_product();
    let id = id.to_string();
    let outcome = submit_form(&form, &mutation, |payload| UpdateProduct { id, payload }).await;

    match outcome {
        SubmitOutcome::Saved(product) => {
            selection.reset_all();
            writeln!(out, "{}", updated_message(&product))?;
            Ok(())
        }
        SubmitOutcome::Invalid(errors) => invalid(out, &errors),
        SubmitOutcome::Failed(error) => Err(anyhow!(error).context("Error updating product")),
    }
}

async fn delete<W: Write>(app: &AppContext, id: &str, out: &mut W) -> Result<()> {
    let product = fetch_product(app, id).await?;
    let selection = SelectionStore::new();
    begin_delete(&selection, product);

    match confirm_delete(&selection, &app.catalog().delete_product()).await {
        DeleteOutcome::Deleted(product) => {
            writeln!(out, "{}", deleted_message(&product))?;
            Ok(())
        }
        DeleteOutcome::Failed(error) => Err(anyhow!(error).context("Error deleting product")),
        DeleteOutcome::NothingSelected => bail!("No product selected"),
    }
}

fn prefs<W: Write>(app: &AppContext, currency: Option<String>, out: &mut W) -> Result<()> {
    if let Some(currency) = currency {
        let currency = currency.trim().to_uppercase();
        if currency.is_empty() {
            bail!("Currency code must not be empty");
        }
        app.storage().set(CURRENCY_KEY, &currency);
    }
    writeln!(out, "currency: {}", app.currency())?;
    writeln!(out, "storage:  {}", app.storage().path().display())?;
    Ok(())
}

fn categories<W: Write>(out: &mut W) -> Result<()> {
    for category in ProductCategory::ALL {
        writeln!(out, "{:<12} {}", category.as_str(), category.label())?;
    }
    Ok(())
}

async fn fetch_product(app: &AppContext, id: &str) -> Result<Arc<Product>> {
    let mut subscription = app.catalog().product(id);
    load(&mut subscription)
        .await
        .with_context(|| format!("Error loading product {}", id))
}

fn invalid<W: Write>(out: &mut W, errors: &FieldErrors) -> Result<()> {
    for (field, message) in errors {
        writeln!(out, "{}: {}", field, message)?;
    }
    bail!("Product form has {} invalid field(s)", errors.len())
}

fn write_table<W: Write>(out: &mut W, products: &[Arc<Product>], currency: &str) -> Result<()> {
    let header = ["NAME", "CATEGORY", "PRICE", "STATUS", "CREATED"];
    let rows: Vec<[String; 5]> = products
        .iter()
        .map(|product| {
            [
                product.name.clone(),
                product.category.label().to_string(),
                format_currency(product.price, currency),
                product.availability_label().to_string(),
                product
                    .created_at
                    .as_deref()
                    .and_then(format_date)
                    .unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();

    let mut widths = header.map(|title| title.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header = header.map(str::to_string);
    for row in std::iter::once(&header).chain(&rows) {
        let line = row
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ");
        writeln!(out, "{}", line.trim_end())?;
    }
    Ok(())
}
