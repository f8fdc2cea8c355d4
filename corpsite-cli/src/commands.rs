//! Command implementations
//!
//! Each command works on one entity kind through the generic store slice;
//! `for_kind!` picks the slice for a runtime [`EntityKind`].

use anyhow::{bail, Context, Result};
use corpsite_core::auth::{LoginForm, SignupForm};
use corpsite_core::entities::{Entity, EntityId, EntityKind};
use corpsite_core::i18n::Language;
use corpsite_core::store::EntitySlice;
use corpsite_core::views::{ConfirmOutcome, ListRender};
use corpsite_core::AppContext;
use serde_json::Value;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

macro_rules! for_kind {
    ($ctx:expr, $kind:expr, $slice:ident => $body:expr) => {
        match $kind {
            EntityKind::Projects => {
                let $slice = &$ctx.store.projects;
                $body
            }
            EntityKind::Partnerships => {
                let $slice = &$ctx.store.partnerships;
                $body
            }
            EntityKind::Awards => {
                let $slice = &$ctx.store.awards;
                $body
            }
            EntityKind::Careers => {
                let $slice = &$ctx.store.careers;
                $body
            }
            EntityKind::Press => {
                let $slice = &$ctx.store.press;
                $body
            }
            EntityKind::Companies => {
                let $slice = &$ctx.store.companies;
                $body
            }
        }
    };
}

#[derive(Debug, Default)]
pub struct ListOptions {
    pub public: bool,
    pub search: Option<String>,
    pub filters: Vec<(String, String)>,
}

pub async fn login(ctx: &AppContext, email: String, password: String) -> Result<()> {
    let session = ctx.auth().login(&LoginForm { email, password }).await?;
    println!(
        "Logged in as {} ({})",
        session.admin.username,
        session.admin.role.as_str()
    );
    Ok(())
}

pub async fn signup(
    ctx: &AppContext,
    username: String,
    email: String,
    password: String,
    confirm_password: String,
) -> Result<()> {
    let form = SignupForm {
        username,
        email,
        password,
        confirm_password,
    };
    let session = ctx.auth().signup(&form).await?;
    println!(
        "Account created for {} ({})",
        session.admin.username,
        session.admin.role.as_str()
    );
    Ok(())
}

pub fn logout(ctx: &AppContext) -> Result<()> {
    ctx.auth().logout()?;
    println!("Logged out");
    Ok(())
}

pub fn whoami(ctx: &AppContext) -> Result<()> {
    match ctx.session.current() {
        Some(session) => println!(
            "{} <{}> {}",
            session.admin.username,
            session.admin.email,
            session.admin.role.as_str()
        ),
        None => println!("Not logged in"),
    }
    Ok(())
}

pub fn lang(ctx: &AppContext, language: Option<Language>) -> Result<()> {
    if let Some(language) = language {
        ctx.language.change_language(language);
    }
    let document = ctx.language.document();
    println!("{} ({})", document.lang, document.dir.as_str());
    Ok(())
}

pub async fn list(ctx: &AppContext, kind: EntityKind, options: &ListOptions) -> Result<()> {
    for_kind!(ctx, kind, slice => list_kind(ctx, slice, options).await)
}

async fn list_kind<E: Entity>(ctx: &AppContext, slice: &Arc<EntitySlice<E>>, options: &ListOptions) -> Result<()> {
    let mut view = ctx.list_view(slice);
    if let Some(search) = &options.search {
        view.set_search(search.clone());
    }
    for (key, value) in &options.filters {
        if !E::FACETS.contains(&key.as_str()) {
            bail!("unknown filter '{key}' for {}, expected one of: {}", E::KIND, E::FACETS.join(", "));
        }
        view.set_facet(key.clone(), value.clone());
    }

    let rows = if options.public {
        slice.fetch_public().await?;
        view.filter().apply(&slice.public_items())
    } else {
        view.mount().await?;
        match view.render() {
            ListRender::Rows(rows) => rows,
            ListRender::Error(message) => bail!(message),
            ListRender::Empty | ListRender::Loading => Vec::new(),
        }
    };

    if rows.is_empty() {
        println!("No {} found", E::KIND);
    } else {
        print_json(&rows)?;
    }
    Ok(())
}

pub async fn show(ctx: &AppContext, kind: EntityKind, id: &EntityId) -> Result<()> {
    for_kind!(ctx, kind, slice => show_kind(ctx, slice, id).await)
}

async fn show_kind<E: Entity>(ctx: &AppContext, _slice: &Arc<EntitySlice<E>>, id: &EntityId) -> Result<()> {
    let record: E = ctx.client.get_json(&E::item_endpoint(id)).await?;
    print_json(&record)
}

pub async fn create(ctx: &AppContext, kind: EntityKind, data: Value, lang: Option<Language>) -> Result<()> {
    for_kind!(ctx, kind, slice => {
        let record = decode(slice, data)?;
        let saved = slice.create(&record, lang).await?;
        print_json(&saved)
    })
}

pub async fn update(ctx: &AppContext, kind: EntityKind, id: &EntityId, data: Value, patch: bool) -> Result<()> {
    for_kind!(ctx, kind, slice => {
        let saved = if patch {
            slice.patch(id, data).await?
        } else {
            let record = decode(slice, data)?;
            slice.update(id, &record).await?
        };
        print_json(&saved)
    })
}

pub async fn delete(ctx: &AppContext, kind: EntityKind, id: EntityId, yes: bool) -> Result<()> {
    for_kind!(ctx, kind, slice => delete_kind(ctx, slice, id, yes).await)
}

async fn delete_kind<E: Entity>(ctx: &AppContext, slice: &Arc<EntitySlice<E>>, id: EntityId, yes: bool) -> Result<()> {
    let view = ctx.list_view(slice);
    view.delete().select(id.clone())?;

    if !yes && !confirm(&format!("Delete {} {id}?", E::KIND.singular()))? {
        view.delete().cancel();
        println!("Cancelled");
        return Ok(());
    }

    match view.delete().confirm().await? {
        ConfirmOutcome::Removed(id) => println!("Deleted {} {id}", E::KIND.singular()),
        other => println!("Nothing deleted: {other:?}"),
    }
    Ok(())
}

pub async fn carousel(ctx: &AppContext, kind: EntityKind, width: u32, steps: &str) -> Result<()> {
    for_kind!(ctx, kind, slice => carousel_kind(ctx, slice, width, steps).await)
}

async fn carousel_kind<E: Entity>(ctx: &AppContext, slice: &Arc<EntitySlice<E>>, width: u32, steps: &str) -> Result<()> {
    slice.fetch_public().await?;
    let items = slice.public_items();
    let mut carousel = ctx.carousel(items.len(), width);

    for step in steps.chars() {
        match step.to_ascii_lowercase() {
            'l' => {
                carousel.press_left();
            }
            'r' => {
                carousel.press_right();
            }
            other => bail!("unknown step '{other}', use 'l' or 'r'"),
        }
    }

    println!(
        "{} cards, {} per view, direction {}, offset {}px{}",
        items.len(),
        carousel.cards_per_view(),
        carousel.direction().as_str(),
        carousel.translate_offset(),
        if carousel.controls_visible() { "" } else { " (centred)" }
    );
    println!(
        "[{}] <  > [{}]",
        if carousel.left_enabled() { "x" } else { " " },
        if carousel.right_enabled() { "x" } else { " " }
    );
    let window: Vec<&E> = items[carousel.visible_range()].iter().collect();
    print_json(&window)
}

pub async fn metrics(ctx: &AppContext) -> Result<()> {
    let loaded = ctx.store.load_public().await;
    let snapshot = ctx.client.metrics();
    println!("kinds loaded: {loaded}/{}", EntityKind::ALL.len());
    println!("requests: {}", snapshot.requests);
    println!("failures: {}", snapshot.failures);
    println!("auth expired: {}", snapshot.auth_expired);
    println!("stale discarded: {}", snapshot.stale_discarded);
    Ok(())
}

/// Inline JSON, or `@path` to read it from a file
pub fn read_data(raw: &str) -> Result<Value> {
    let text = match raw.strip_prefix('@') {
        Some(path) => {
            let path = PathBuf::from(shellexpand::tilde(path).as_ref());
            std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?
        }
        None => raw.to_string(),
    };
    serde_json::from_str(&text).context("--data is not valid JSON")
}

fn decode<E: Entity>(_slice: &Arc<EntitySlice<E>>, data: Value) -> Result<E> {
    serde_json::from_value(data).with_context(|| format!("--data is not a valid {}", E::KIND.singular()))
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
