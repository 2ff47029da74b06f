//! Web server for the quakemap UI.
//!
//! Serves a single Leaflet page plus a small JSON API over the shared
//! [`AppContext`]:
//! - layer groups and their visibility
//! - hamburger panel, theme and sign-in form state

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    response::Html,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::app::AppContext;
use crate::chrome::{ClassToggle, EmailEvent, PanelState, Theme, ThemeState};
use crate::classify::SeverityTier;
use crate::config::MapView;
use crate::errors::QuakemapError;
use crate::layers::LayerGroup;

/// Server bind configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    ctx: Arc<RwLock<AppContext>>,
}

impl AppState {
    #[must_use]
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx: Arc::new(RwLock::new(ctx)),
        }
    }
}

/// Create the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/config", get(config_handler))
        .route("/api/layers", get(layers_handler))
        .route("/api/layers/{tier}/show", post(show_layer_handler))
        .route("/api/layers/{tier}/hide", post(hide_layer_handler))
        .route("/api/session", post(session_handler))
        .route("/api/panel/toggle", post(panel_toggle_handler))
        .route("/api/theme", get(theme_handler).post(set_theme_handler))
        .route("/api/email/{event}", post(email_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Start the web server.
pub async fn run_server(config: ServerConfig, ctx: AppContext) -> anyhow::Result<()> {
    let app = create_router(AppState::new(ctx));

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("🌍 quakemap starting at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Response Bodies
// ============================================================================

/// Legend entry for one tier.
#[derive(Debug, Serialize)]
struct TierLegend {
    tier: SeverityTier,
    color: String,
    /// Lowest magnitude of the tier, `None` for the open-ended bottom tier
    from: Option<f64>,
}

#[derive(Debug, Serialize)]
struct ConfigResponse {
    map: MapView,
    tiers: Vec<TierLegend>,
}

#[derive(Debug, Serialize)]
struct LayerStatus {
    tier: SeverityTier,
    attached: bool,
    markers: usize,
}

#[derive(Debug, Serialize)]
struct PanelResponse {
    state: PanelState,
    classes: [ClassToggle; 3],
}

#[derive(Debug, Serialize)]
struct ThemeResponse {
    theme: Theme,
    os_preference: Theme,
    manual_override: Option<Theme>,
    properties: BTreeMap<&'static str, &'static str>,
}

impl From<ThemeState> for ThemeResponse {
    fn from(state: ThemeState) -> Self {
        let theme = state.effective();
        Self {
            theme,
            os_preference: state.os_preference,
            manual_override: state.manual_override,
            properties: theme.custom_properties().into_iter().collect(),
        }
    }
}

/// Page state after a reset.
#[derive(Debug, Serialize)]
struct SessionResponse {
    panel: PanelResponse,
    theme: ThemeResponse,
    visible_layers: usize,
}

/// Checkbox mode: follow the OS or force a theme.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ThemeMode {
    System,
    Light,
    Dark,
}

#[derive(Debug, Deserialize)]
struct ThemeRequest {
    os_prefers_dark: Option<bool>,
    mode: Option<ThemeMode>,
}

#[derive(Debug, Deserialize)]
struct EmailRequest {
    #[serde(default)]
    value: String,
}

#[derive(Debug, Serialize)]
struct EmailResponse {
    error: Option<&'static str>,
    /// Whether the page should re-validate on every input
    revalidate: bool,
    button_label: &'static str,
    button_class: Option<&'static str>,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Main page handler - serves the HTML UI.
async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Map view and tier legend.
async fn config_handler(State(state): State<AppState>) -> Json<ConfigResponse> {
    let ctx = state.ctx.read().await;
    let classifier = ctx.renderer.classifier();
    let c = classifier.config();
    let starts = [None, Some(c.moderate_from), Some(c.strong_from), Some(c.major_from)];

    let tiers = SeverityTier::ALL
        .into_iter()
        .zip(starts)
        .map(|(tier, from)| TierLegend {
            tier,
            color: classifier.color(tier).to_string(),
            from,
        })
        .collect();

    Json(ConfigResponse {
        map: ctx.config.map.clone(),
        tiers,
    })
}

/// All layer groups with their markers.
async fn layers_handler(State(state): State<AppState>) -> Json<Vec<LayerGroup>> {
    let ctx = state.ctx.read().await;
    Json(ctx.layers.layers().cloned().collect())
}

async fn show_layer_handler(
    State(state): State<AppState>,
    Path(tier): Path<String>,
) -> Result<Json<LayerStatus>, QuakemapError> {
    set_layer_visibility(&state, &tier, true).await
}

async fn hide_layer_handler(
    State(state): State<AppState>,
    Path(tier): Path<String>,
) -> Result<Json<LayerStatus>, QuakemapError> {
    set_layer_visibility(&state, &tier, false).await
}

async fn set_layer_visibility(
    state: &AppState,
    tier: &str,
    visible: bool,
) -> Result<Json<LayerStatus>, QuakemapError> {
    let tier: SeverityTier = tier.parse()?;
    let mut ctx = state.ctx.write().await;

    let found = if visible {
        ctx.layers.show_layer(tier)
    } else {
        ctx.layers.remove_layer(tier)
    };
    if !found {
        return Err(QuakemapError::LayerNotFound(tier.to_string()));
    }

    tracing::info!("{} layer {} via UI", tier, if visible { "shown" } else { "hidden" });

    let group = ctx
        .layers
        .get(tier)
        .ok_or_else(|| QuakemapError::LayerNotFound(tier.to_string()))?;
    Ok(Json(LayerStatus {
        tier,
        attached: group.attached,
        markers: group.markers.len(),
    }))
}

/// Page load: start from a closed panel, no theme override, an empty
/// email field and every layer attached.
async fn session_handler(State(state): State<AppState>) -> Json<SessionResponse> {
    let mut ctx = state.ctx.write().await;
    ctx.reset_session();
    Json(SessionResponse {
        panel: PanelResponse {
            state: ctx.panel,
            classes: ctx.panel.classes(),
        },
        theme: ctx.theme.into(),
        visible_layers: ctx.layers.visible_layers().count(),
    })
}

/// Hamburger click.
async fn panel_toggle_handler(State(state): State<AppState>) -> Json<PanelResponse> {
    let mut ctx = state.ctx.write().await;
    let panel = ctx.panel.toggle();
    tracing::debug!("panel {:?}", panel);
    Json(PanelResponse {
        state: panel,
        classes: panel.classes(),
    })
}

async fn theme_handler(State(state): State<AppState>) -> Json<ThemeResponse> {
    let ctx = state.ctx.read().await;
    Json(ctx.theme.into())
}

/// OS preference change and/or dark-mode checkbox.
async fn set_theme_handler(
    State(state): State<AppState>,
    Json(req): Json<ThemeRequest>,
) -> Json<ThemeResponse> {
    let mut ctx = state.ctx.write().await;

    if let Some(dark) = req.os_prefers_dark {
        ctx.theme
            .set_os_preference(if dark { Theme::Dark } else { Theme::Light });
    }
    match req.mode {
        Some(ThemeMode::System) => ctx.theme.set_override(None),
        Some(ThemeMode::Light) => ctx.theme.set_override(Some(Theme::Light)),
        Some(ThemeMode::Dark) => ctx.theme.set_override(Some(Theme::Dark)),
        None => {}
    }

    tracing::debug!("theme now {:?}", ctx.theme.effective());
    Json(ctx.theme.into())
}

/// Sign-in field events. Validation only; the address goes nowhere.
async fn email_handler(
    State(state): State<AppState>,
    Path(event): Path<String>,
    Json(req): Json<EmailRequest>,
) -> Result<Json<EmailResponse>, QuakemapError> {
    let event: EmailEvent = event.parse().map_err(QuakemapError::InvalidQuery)?;

    let mut ctx = state.ctx.write().await;
    ctx.email.handle(event, &req.value);

    let submit = ctx.email.submit_state();
    Ok(Json(EmailResponse {
        error: ctx.email.error_message(),
        revalidate: ctx.email.is_revalidating(),
        button_label: submit.label(),
        button_class: submit.class(),
    }))
}

/// Health check endpoint.
async fn health_handler() -> &'static str {
    "OK"
}

// ============================================================================
// HTML Template (embedded for single-binary deployment)
// ============================================================================

const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>quakemap</title>

    <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" />
    <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>

    <style>
        :root {
            --global-html-color: #1d1d1b;
            --global-html-backgroundColor: #ffffff;
            --popup-iconColor: #1d1d1b;
            --popup-detailsTextColor: #6b6b6b;
            --global-leaflet-wekit-filter: none;
        }
        html, body {
            height: 100%;
            margin: 0;
            font-family: system-ui, sans-serif;
            color: var(--global-html-color);
            background-color: var(--global-html-backgroundColor);
        }
        #mapid { position: absolute; inset: 0; }
        #mapid .leaflet-tile-pane { filter: var(--global-leaflet-wekit-filter); }

        .c-sidebar {
            position: absolute; top: 0; left: 0; z-index: 1000;
            padding: 12px 16px;
        }
        .logo { font-weight: 700; letter-spacing: 0.05em; }
        .logo.light-color { color: #ffffff; }

        .hamburger-menu { cursor: pointer; display: inline-block; }
        .hamburger-menu div {
            width: 26px; height: 3px; margin: 5px 0;
            background-color: var(--global-html-color);
            transition: 0.3s;
        }
        .hamburger-menu.change div:nth-child(1) { transform: translate(0, 8px) rotate(-45deg); }
        .hamburger-menu.change div:nth-child(2) { opacity: 0; }
        .hamburger-menu.change div:nth-child(3) { transform: translate(0, -8px) rotate(45deg); }

        .property-panel {
            display: none;
            margin-top: 12px; padding: 12px;
            background-color: var(--global-html-backgroundColor);
            border-radius: 6px;
            box-shadow: 0 1px 4px rgba(0, 0, 0, 0.3);
        }
        .property-panel.c-sidebar__properties--force-show { display: block; }
        .tier-toggle { display: flex; align-items: center; gap: 6px; margin: 4px 0; }
        .tier-swatch { width: 12px; height: 12px; border-radius: 50%; }

        .c-lead-capture { margin-top: 12px; }
        .c-lead-capture .has-error input { border-color: #ED2939; }
        .js-email-error-message { display: none; color: #ED2939; font-size: 0.85em; }
        .c-lead-capture__submit--failed { background-color: #ED2939; color: #ffffff; }
        .c-lead-capture__submit--success { background-color: #50C878; color: #ffffff; }

        .c-popup__title { font-size: 1.05em; margin: 0 0 4px; }
        .c-popup__date, .c-popup__text { margin: 2px 0; color: var(--popup-detailsTextColor); }
        .c-popup__richter-container { position: relative; height: 8px; margin: 8px 0 2px; }
        .c-popup__richter-bar { position: absolute; top: 0; left: 0; height: 8px; border-radius: 4px; }
        .c-popup__richter-bar--background { width: 100%; background-color: #e0e0e0; }
        .c-popup__richter-labels { display: flex; justify-content: space-between; color: var(--popup-iconColor); }
        .c-popup__richter-labels p { margin: 0; }
    </style>
</head>
<body>
    <div id="mapid"></div>

    <aside class="c-sidebar">
        <span class="logo">quakemap</span>
        <div class="hamburger-menu js-hamburger-menu"><div></div><div></div><div></div></div>

        <div class="property-panel js-property-panel js-properties">
            <h3>Magnitude</h3>
            <div class="js-tier-toggles"></div>

            <label><input type="checkbox" class="js-dark-mode"> Dark mode</label>

            <form class="c-lead-capture" novalidate>
                <div class="js-username">
                    <label for="username">Email</label>
                    <input type="email" id="username" autocomplete="email">
                    <span class="js-email-error-message"></span>
                </div>
                <button type="submit" class="js-sign-in-button">Submit</button>
            </form>
        </div>
    </aside>

    <script>
    "use strict";

    const post = (url, body) =>
        fetch(url, {
            method: "POST",
            headers: { "Content-Type": "application/json" },
            body: JSON.stringify(body || {}),
        }).then((r) => r.json());

    /* Map */
    const createMap = function (view) {
        const map = L.map("mapid", { zoomControl: false, maxZoom: view.max_zoom })
            .setView(view.center, view.zoom);
        L.tileLayer(view.tile_url, { attribution: view.attribution }).addTo(map);
        L.control.scale({ position: "bottomright", updateWhenIdle: true, imperial: false, maxWidth: 150 }).addTo(map);
        L.control.zoom({ position: "bottomright" }).addTo(map);
        return map;
    };

    const showLayers = function (map, groups) {
        const container = document.querySelector(".js-tier-toggles");
        for (const group of groups) {
            const layer = L.layerGroup();
            for (const m of group.markers) {
                L.circleMarker([m.lat, m.lon], {
                    radius: m.radius,
                    fillColor: m.color,
                    fillOpacity: m.fill_opacity,
                    weight: m.weight,
                    color: m.color,
                }).bindPopup(m.popup_html).addTo(layer);
            }
            if (group.attached) layer.addTo(map);

            const row = document.createElement("label");
            row.className = "tier-toggle";
            row.innerHTML = `<input type="checkbox" ${group.attached ? "checked" : ""}>
                <span class="tier-swatch" style="background-color:${group.color}"></span>
                ${group.tier} (${group.markers.length})`;
            row.querySelector("input").addEventListener("change", (e) => {
                const action = e.target.checked ? "show" : "hide";
                post(`/api/layers/${group.tier}/${action}`).then((status) => {
                    if (status.attached) map.addLayer(layer);
                    else map.removeLayer(layer);
                });
            });
            container.appendChild(row);
        }
    };

    /* Hamburger */
    const listenToHamburger = function () {
        document.querySelector(".js-hamburger-menu").addEventListener("click", () => {
            post("/api/panel/toggle").then((panel) => {
                for (const c of panel.classes) {
                    const el = document.querySelector(c.selector);
                    if (el) el.classList.toggle(c.class, c.present);
                }
            });
        });
    };

    /* Dark mode */
    const applyTheme = function (theme) {
        for (const [name, value] of Object.entries(theme.properties)) {
            document.documentElement.style.setProperty(name, value);
        }
        document.querySelector(".js-dark-mode").checked = theme.theme === "dark";
    };

    const listenToDarkMode = function () {
        const query = window.matchMedia("(prefers-color-scheme: dark)");
        post("/api/theme", { os_prefers_dark: query.matches }).then(applyTheme);
        query.addEventListener("change", (e) => post("/api/theme", { os_prefers_dark: e.matches }).then(applyTheme));
        document.querySelector(".js-dark-mode").addEventListener("change", (e) => {
            post("/api/theme", { mode: e.target.checked ? "dark" : "light" }).then(applyTheme);
        });
    };

    /* Sign-in form */
    const listenToEmail = function () {
        const field = document.querySelector(".js-username");
        const input = document.getElementById("username");
        const message = document.querySelector(".js-email-error-message");
        const button = document.querySelector(".js-sign-in-button");

        const render = function (state) {
            field.classList.toggle("has-error", state.error !== null);
            message.textContent = state.error || "";
            message.style.display = state.error ? "block" : "none";
            button.classList.remove("c-lead-capture__submit--failed", "c-lead-capture__submit--success");
            if (state.button_class) button.classList.add(state.button_class);
            button.textContent = state.button_label;

            if (state.revalidate) input.addEventListener("input", onInput);
            else input.removeEventListener("input", onInput);
        };
        const send = (event) => post(`/api/email/${event}`, { value: input.value }).then(render);
        const onInput = () => send("input");

        input.addEventListener("blur", () => send("blur"));
        input.addEventListener("focus", () => send("focus"));
        button.addEventListener("click", (e) => {
            e.preventDefault();
            send("submit");
        });
    };

    const init = function () {
        post("/api/session")
            .then(() => fetch("/api/config"))
            .then((r) => r.json())
            .then((config) => {
                const map = createMap(config.map);
                listenToHamburger();
                listenToDarkMode();
                listenToEmail();
                return fetch("/api/layers")
                    .then((r) => r.json())
                    .then((groups) => showLayers(map, groups));
            })
            .catch((error) => console.log(error));
    };

    document.addEventListener("DOMContentLoaded", init);
    </script>
</body>
</html>
"##;
