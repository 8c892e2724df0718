//! The render engine.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;
use std::sync::{Arc, LazyLock};
use std::time::Instant;

use frix_config::Config;
use frix_renderer::{CssAggregator, Injector, TemplateChain, TemplateLibrary, resolve_content};
use frix_storage::{FsStorage, Storage};
use regex::Regex;
use tokio::task::JoinSet;

use crate::api::QueryApi;
use crate::error::{PageError, SiteError};
use crate::handler::RequestHandler;
use crate::modifier::{ExtensionPoint, Modifier, ModifierError, ModifierRegistry, Registration};
use crate::page::{Page, PageFailure, RenderedSite};
use crate::resolver::{PageSpec, Resolver};

static HEAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<head\b[^>]*>(.*?)</head>").unwrap());

/// Result of a render pass.
#[derive(Debug, Clone)]
pub struct Rendered {
    /// Routes request paths to rendered pages.
    pub handler: RequestHandler,
    /// Queries over the rendered pages.
    pub api: QueryApi,
}

/// Render context: configuration, storage backend and registered modifiers.
///
/// Modifiers are registered through `&mut self` and passes run through
/// `&self`, so the registry cannot change while a pass is in flight.
/// Registrations persist across passes.
pub struct Frix {
    config: Arc<Config>,
    storage: Option<Arc<dyn Storage>>,
    modifiers: ModifierRegistry,
}

impl Frix {
    /// Create an engine reading from the filesystem at `config.root`.
    ///
    /// Modifiers listed in the configuration are registered by name.
    ///
    /// # Errors
    ///
    /// Returns [`ModifierError`] if a configured modifier entry names an
    /// unknown extension point or built-in.
    pub fn new(config: Config) -> Result<Self, ModifierError> {
        let mut modifiers = ModifierRegistry::new();
        for entry in &config.modifiers {
            modifiers.add_named(&entry.target, &entry.modifier)?;
        }
        Ok(Self {
            config: Arc::new(config),
            storage: None,
            modifiers,
        })
    }

    /// Use `storage` instead of the filesystem at `config.root`.
    #[must_use]
    pub fn with_storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Mutable configuration for subsequent passes.
    pub fn config_mut(&mut self) -> &mut Config {
        Arc::make_mut(&mut self.config)
    }

    /// Registered modifiers.
    #[must_use]
    pub fn modifiers(&self) -> &ModifierRegistry {
        &self.modifiers
    }

    /// Mutable access to the modifier registry.
    pub fn modifiers_mut(&mut self) -> &mut ModifierRegistry {
        &mut self.modifiers
    }

    /// Append `modifier` to the extension point named `target`.
    ///
    /// # Errors
    ///
    /// Returns [`ModifierError::UnknownExtensionPoint`] for an unknown target.
    pub fn add_modifier<M>(&mut self, target: &str, modifier: M) -> Result<(), ModifierError>
    where
        M: Modifier + 'static,
    {
        self.modifiers.add_modifier(target, modifier)
    }

    /// Append the modifier of an object-form registration.
    ///
    /// # Errors
    ///
    /// See [`ModifierRegistry::add`].
    pub fn add(&mut self, registration: Registration) -> Result<(), ModifierError> {
        self.modifiers.add(registration)
    }

    fn storage(&self) -> Arc<dyn Storage> {
        match &self.storage {
            Some(storage) => Arc::clone(storage),
            None => Arc::new(FsStorage::new(self.config.root.clone())),
        }
    }

    /// Run a render pass over every page of the key document.
    ///
    /// Pages render concurrently; a page that fails is logged, recorded in
    /// [`QueryApi::failures`] and left out. The aggregated stylesheet is
    /// always written, page HTML only when `output.write_pages` is set.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError`] if the key document cannot be used, the
    /// templates directory cannot be listed, an output cannot be written, or
    /// a page task panics.
    pub async fn render(&self) -> Result<Rendered, SiteError> {
        let start = Instant::now();
        let config = Arc::clone(&self.config);
        let storage = self.storage();
        let resolver = Resolver::new(Arc::clone(&config), Arc::clone(&storage));

        let specs = resolver.pages()?;
        let library = Arc::new(resolver.library()?);
        let modifiers = Arc::new(self.modifiers.clone());

        let mut tasks = JoinSet::new();
        for spec in specs {
            let resolver = resolver.clone();
            let library = Arc::clone(&library);
            let modifiers = Arc::clone(&modifiers);
            tasks.spawn(async move {
                let result = render_page(&resolver, &library, &modifiers, &spec).await;
                (spec, result)
            });
        }

        let mut pages = BTreeMap::new();
        let mut chains = BTreeMap::new();
        let mut failures = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let (spec, result) = joined?;
            match result {
                Ok((page, chain)) => {
                    chains.insert(spec.url.clone(), chain);
                    pages.insert(spec.url, (page, spec.output));
                }
                Err(e) => {
                    tracing::warn!(url = %spec.url, error = %e, "Page render failed");
                    failures.push(PageFailure {
                        url: spec.url,
                        reason: e,
                    });
                }
            }
        }
        failures.sort_by(|a, b| a.url.cmp(&b.url));

        let mut css = CssAggregator::new();
        for chain in chains.values() {
            css.add_chain(chain);
        }
        let stylesheet = modifiers.apply(ExtensionPoint::Css, css.finish()).await;
        storage.write(&config.stylesheet_path(), &stylesheet)?;

        let mut table = BTreeMap::new();
        for (url, (page, output)) in pages {
            if config.output.write_pages {
                storage.write(&output, &page.html)?;
            }
            table.insert(url, page);
        }

        tracing::info!(
            pages = table.len(),
            failed = failures.len(),
            elapsed_ms = start.elapsed().as_millis(),
            "Render pass complete"
        );

        let site = Arc::new(RenderedSite {
            config,
            pages: table,
            stylesheet,
            failures,
        });
        Ok(Rendered {
            handler: RequestHandler::new(Arc::clone(&site)),
            api: QueryApi::new(site),
        })
    }
}

impl fmt::Debug for Frix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frix")
            .field("config", &self.config)
            .field("custom_storage", &self.storage.is_some())
            .field("modifiers", &self.modifiers)
            .finish()
    }
}

async fn render_page(
    resolver: &Resolver,
    library: &TemplateLibrary,
    modifiers: &ModifierRegistry,
    spec: &PageSpec,
) -> Result<(Page, TemplateChain), PageError> {
    let raw = resolver.load_content(spec)?;
    let chain = TemplateChain::build(library, &spec.template)?;
    let content = resolve_content(library, &spec.template, &raw)?;
    let html = Injector::new(library).render(&spec.template, &content)?;

    let html = modifiers.apply(ExtensionPoint::Content, html).await;
    let html = apply_header(modifiers, html).await;

    let page = Page {
        url: spec.url.clone(),
        name: spec.template.clone(),
        filename: spec.filename.clone(),
        content,
        html,
    };
    Ok((page, chain))
}

/// Run `header` modifiers over the inner HTML of the first `<head>` section.
async fn apply_header(modifiers: &ModifierRegistry, mut html: String) -> String {
    if modifiers.len(ExtensionPoint::Header) == 0 {
        return html;
    }
    let Some(range) = head_inner(&html) else {
        return html;
    };

    let inner = html[range.clone()].to_owned();
    let modified = modifiers.apply(ExtensionPoint::Header, inner).await;
    html.replace_range(range, &modified);
    html
}

fn head_inner(html: &str) -> Option<Range<usize>> {
    HEAD.captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.range())
}
