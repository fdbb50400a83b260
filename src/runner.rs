use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{Local, Utc};

use crate::config::AppConfig;
use crate::diff::diff;
use crate::fetcher::HttpFetcher;
use crate::models::{Product, RunResult, safe_name};
use crate::notifier::{EmailNotifier, Notifier, build_email_body, build_restock_body};
use crate::sitelog::SiteLogger;
use crate::sites::{SiteChecker, find_entry};
use crate::store::SeenStore;
use crate::utils::error::{AppError, Result};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Drives the per-site pipeline: lock, load seen set, fetch, diff,
/// notify, persist. Sites run independently; one site's failure is
/// recorded on its RunResult and never aborts the others.
///
/// Ordering invariant: the seen set is persisted only after the notify
/// attempt for the run has succeeded (or nothing needed notifying). A
/// failed notify leaves the seen set untouched so the same items retry
/// on the next scheduled run; a failed persist after a successful notify
/// may duplicate a notification next run, which is the accepted side of
/// that trade-off.
pub struct Runner {
    store: SeenStore,
    fetcher: HttpFetcher,
    notifier: Box<dyn Notifier>,
    logs_dir: PathBuf,
}

impl Runner {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let data_dir = Path::new(&config.storage.data_dir);
        Ok(Self {
            store: SeenStore::open(data_dir, config.storage.lock_stale_secs)?,
            fetcher: HttpFetcher::new(&config.fetcher)?,
            notifier: Box::new(EmailNotifier::new(config.smtp.clone())),
            logs_dir: data_dir.join("logs"),
        })
    }

    /// Swap the notification transport (tests use a recording fake).
    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Run the checkers for the given registry tokens, in order. An
    /// unknown token is a configuration error and fails before any site
    /// runs; per-site failures are collected in the results instead.
    pub async fn run_tokens(&self, tokens: &[String]) -> Result<Vec<RunResult>> {
        let mut checkers = Vec::new();
        for token in tokens {
            let entry = find_entry(token).ok_or_else(|| AppError::UnknownSite {
                token: token.clone(),
            })?;
            checkers.push(entry.build());
        }

        let mut results = Vec::new();
        for checker in &checkers {
            results.push(self.run_site(checker.as_ref()).await);
        }
        Ok(results)
    }

    /// One site's full pipeline run.
    pub async fn run_site(&self, checker: &dyn SiteChecker) -> RunResult {
        let site = checker.site_name().to_string();
        let stem = safe_name(&site);

        let logger = match SiteLogger::new(&self.logs_dir, &stem) {
            Ok(logger) => logger,
            Err(err) => return RunResult::failed(site, err.to_string()),
        };

        // Exclusive per-site lock for the whole load-process-save span.
        // Released on drop, on every path out of this function.
        let _lock = match self.store.lock(&stem) {
            Ok(lock) => lock,
            Err(err) => {
                logger.log(&format!("SKIPPED - {err}"));
                return RunResult::failed(site, err.to_string());
            }
        };

        let mut seen = self.store.load(&stem);

        let products = match checker.fetch_products(&self.fetcher).await {
            Ok(products) => products,
            Err(err) => {
                logger.log(&format!("ERROR fetching products: {err}"));
                return RunResult::failed(site, err.to_string());
            }
        };

        if products.is_empty() {
            // An empty fetch is never "everything disappeared"; leave the
            // seen set alone and let the next run try again.
            logger.log("No products found (zero-fetch)");
            return RunResult::ok(site, 0, Vec::new());
        }

        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();

        let restocked = self.run_restock_channel(checker, &stem, &products, &timestamp, &logger).await;

        let new_products = diff(&products, &seen.ids);
        let to_email: Vec<Product> = new_products
            .iter()
            .filter(|p| !restocked.contains(&p.id))
            .cloned()
            .collect();

        if to_email.is_empty() {
            logger.log(&format!("OK - {} items, no new products", products.len()));
        } else {
            let subject = checker.email_subject(&to_email, &timestamp);
            let body = build_email_body(&checker.email_intro(), &to_email, &checker.search_url());
            if let Err(err) = self.notifier.notify(&subject, &body).await {
                logger.log(&format!("ERROR failed to send email: {err}"));
                // Do not persist: the same items must retry next run.
                return RunResult::failed(site, err.to_string());
            }
            logger.log(&format!("NEW ITEMS alert sent for {} item(s)", to_email.len()));
        }

        seen.absorb(products.iter().map(|p| p.id.clone()));
        if let Err(err) = self.store.save(&stem, &seen) {
            // Unsafe window: the notification went out but the update did
            // not stick, so the next run may re-notify.
            logger.log(&format!("ERROR persisting seen set: {err}"));
            return RunResult::failed(site, err.to_string());
        }
        logger.log(&format!("Updated seen products ({} total)", seen.len()));

        RunResult::ok(site, products.len(), new_products)
    }

    /// Site-specific restock alerts: signed, in-stock items past their
    /// per-item cooldown re-alert independently of the seen set. Returns
    /// the ids covered by a successfully sent restock alert so the
    /// new-items email does not repeat them.
    async fn run_restock_channel(
        &self,
        checker: &dyn SiteChecker,
        stem: &str,
        products: &[Product],
        timestamp: &str,
        logger: &SiteLogger,
    ) -> HashSet<String> {
        let mut covered = HashSet::new();
        let Some(cooldown) = checker.restock_cooldown() else {
            return covered;
        };

        let mut stamps = self.store.load_stamp_map(stem);
        let now = Utc::now().timestamp();

        let due: Vec<Product> = products
            .iter()
            .filter(|p| p.signed == Some(true) && p.available == Some(true))
            .filter(|p| now - stamps.get(&p.id).copied().unwrap_or(0) >= cooldown.num_seconds())
            .cloned()
            .collect();
        if due.is_empty() {
            return covered;
        }

        let subject = checker.restock_subject(&due, timestamp);
        let body = build_restock_body(&checker.restock_intro(), &due, checker.base_url());
        match self.notifier.notify(&subject, &body).await {
            Ok(()) => {
                for product in &due {
                    stamps.insert(product.id.clone(), now);
                    covered.insert(product.id.clone());
                }
                if let Err(err) = self.store.save_stamp_map(stem, &stamps) {
                    logger.log(&format!("ERROR persisting signed-alert timestamps: {err}"));
                }
                logger.log(&format!("SIGNED alert sent for {} item(s)", due.len()));
            }
            Err(err) => {
                // The items stay eligible for the new-items email below.
                logger.log(&format!("ERROR failed to send signed alert: {err}"));
            }
        }

        covered
    }
}
