//! WebAssembly bindings for BluBlock
//!
//! `install()` wraps the page's `fetch` and `XMLHttpRequest.prototype.open`
//! so every outbound request is screened by the engine first. The exported
//! accessors and mutators back the settings UI.

mod host;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use blu_core::{Category, Engine, EngineHandle, Verdict};
use js_sys::{Array, Function, Object, Promise, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Response, ResponseInit};

pub use host::{ConsoleNotifier, LocalStorageStore};

type Hook = Closure<dyn FnMut(JsValue, Array, Function) -> Result<JsValue, JsValue>>;

// Calls `hook(this, args, original)` so the receiver reaches the original.
#[wasm_bindgen(inline_js = "export function wrap_with_receiver(original, hook) {
    return function (...args) { return hook(this, args, original); };
}")]
extern "C" {
    fn wrap_with_receiver(original: &Function, hook: &Function) -> Function;
}

struct Installed {
    engine: EngineHandle,
    global: Object,
    original_fetch: Function,
    xhr: Option<PatchedOpen>,
    active: Rc<Cell<bool>>,
    fetch_hook: Hook,
}

struct PatchedOpen {
    prototype: Object,
    original_open: Function,
    open_hook: Hook,
    noop: Closure<dyn Fn()>,
}

/// Methods replaced by a no-op on a request whose `open` was blocked.
const NEUTRALIZED: [&str; 2] = ["send", "setRequestHeader"];

thread_local! {
    static INSTALLED: RefCell<Option<Installed>> = const { RefCell::new(None) };
}

// =============================================================================
// Install / uninstall
// =============================================================================

/// Build the engine from `localStorage` and patch the network primitives.
#[wasm_bindgen]
pub fn install() -> Result<(), JsValue> {
    if is_installed() {
        return Err(JsValue::from_str("Already installed. Call uninstall() first."));
    }

    let engine = Engine::builder(LocalStorageStore::from_window())
        .notifier(ConsoleNotifier)
        .build()
        .into_handle();
    let active = Rc::new(Cell::new(true));

    let global: Object = js_sys::global();
    let original_fetch: Function = Reflect::get(&global, &"fetch".into())?.dyn_into()?;
    let fetch_hook = fetch_hook(engine.clone(), active.clone());
    let wrapped = wrap_with_receiver(&original_fetch, fetch_hook.as_ref().unchecked_ref());
    Reflect::set(&global, &"fetch".into(), &wrapped)?;

    // Workers have fetch but no XMLHttpRequest.
    let xhr = match Reflect::get(&global, &"XMLHttpRequest".into())? {
        ctor if ctor.is_undefined() => None,
        ctor => Some(patch_open(&ctor, engine.clone(), active.clone())?),
    };

    INSTALLED.with(|cell| {
        *cell.borrow_mut() = Some(Installed {
            engine,
            global,
            original_fetch,
            xhr,
            active,
            fetch_hook,
        });
    });
    Ok(())
}

/// Restore the original `fetch` and `open`. No-op when not installed.
///
/// Page code may still hold the wrappers, so their hooks are leaked rather
/// than dropped; once inactive they forward every call to the original.
#[wasm_bindgen]
pub fn uninstall() -> Result<(), JsValue> {
    let Some(installed) = INSTALLED.with(|cell| cell.borrow_mut().take()) else {
        return Ok(());
    };
    installed.active.set(false);
    installed.fetch_hook.forget();

    let mut result = Reflect::set(&installed.global, &"fetch".into(), &installed.original_fetch).map(drop);
    if let Some(xhr) = installed.xhr {
        result = result.and(Reflect::set(&xhr.prototype, &"open".into(), &xhr.original_open).map(drop));
        xhr.open_hook.forget();
        xhr.noop.forget();
    }
    result
}

#[wasm_bindgen]
pub fn is_installed() -> bool {
    INSTALLED.with(|cell| cell.borrow().is_some())
}

fn fetch_hook(engine: EngineHandle, active: Rc<Cell<bool>>) -> Hook {
    Closure::wrap(Box::new(move |receiver: JsValue, args: Array, original: Function| {
        if !active.get() {
            return original.apply(&receiver, &args);
        }
        let url = request_url(&args.get(0));
        match engine.screen(url.as_deref()) {
            Verdict::Block(_) => empty_success(),
            Verdict::Allow => original.apply(&receiver, &args),
        }
    }) as Box<dyn FnMut(JsValue, Array, Function) -> Result<JsValue, JsValue>>)
}

fn patch_open(ctor: &JsValue, engine: EngineHandle, active: Rc<Cell<bool>>) -> Result<PatchedOpen, JsValue> {
    let prototype: Object = Reflect::get(ctor, &"prototype".into())?.dyn_into()?;
    let original_open: Function = Reflect::get(&prototype, &"open".into())?.dyn_into()?;

    let noop = Closure::<dyn Fn()>::new(|| {});
    let noop_fn: Function = noop.as_ref().unchecked_ref::<Function>().clone();

    let open_hook: Hook = Closure::wrap(Box::new(move |receiver: JsValue, args: Array, original: Function| {
        if !active.get() {
            return original.apply(&receiver, &args);
        }
        let url = args.get(1).as_string();
        match engine.screen(url.as_deref()) {
            Verdict::Block(_) => {
                for method in NEUTRALIZED {
                    let _ = Reflect::set(&receiver, &method.into(), &noop_fn);
                }
                Ok(JsValue::UNDEFINED)
            }
            Verdict::Allow => {
                // A reused request object gets its real methods back.
                if let Some(obj) = receiver.dyn_ref::<Object>() {
                    for method in NEUTRALIZED {
                        let own = Reflect::get(obj, &method.into()).unwrap_or(JsValue::UNDEFINED);
                        if Object::is(&own, &noop_fn) {
                            let _ = Reflect::delete_property(obj, &method.into());
                        }
                    }
                }
                original.apply(&receiver, &args)
            }
        }
    }) as Box<dyn FnMut(JsValue, Array, Function) -> Result<JsValue, JsValue>>);

    let wrapped = wrap_with_receiver(&original_open, open_hook.as_ref().unchecked_ref());
    Reflect::set(&prototype, &"open".into(), &wrapped)?;

    Ok(PatchedOpen {
        prototype,
        original_open,
        open_hook,
        noop,
    })
}

/// URL of a `fetch` argument: a string, or anything with a string `url` field.
fn request_url(arg: &JsValue) -> Option<String> {
    arg.as_string().or_else(|| {
        if !arg.is_object() {
            return None;
        }
        Reflect::get(arg, &"url".into()).ok()?.as_string()
    })
}

fn empty_response() -> Result<Response, JsValue> {
    let init = ResponseInit::new();
    init.set_status(200);
    Response::new_with_opt_str_and_init(None, &init)
}

fn empty_success() -> Result<JsValue, JsValue> {
    Ok(Promise::resolve(&JsValue::from(empty_response()?)).into())
}

// =============================================================================
// UI surface
// =============================================================================

fn with_engine<R>(f: impl FnOnce(&EngineHandle) -> R) -> Result<R, JsValue> {
    INSTALLED.with(|cell| {
        cell.borrow()
            .as_ref()
            .map(|installed| f(&installed.engine))
            .ok_or_else(|| JsValue::from_str("Not installed. Call install() first."))
    })
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let text = serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))?;
    js_sys::JSON::parse(&text)
}

/// `{ enabled, mode, modules, stats, log }`
#[wasm_bindgen]
pub fn get_dashboard() -> Result<JsValue, JsValue> {
    let dashboard = with_engine(|engine| engine.read(Engine::snapshot))?;
    to_js(&dashboard)
}

#[wasm_bindgen]
pub fn get_mode() -> Result<String, JsValue> {
    with_engine(|engine| engine.read(|e| e.mode().id().to_string()))
}

#[wasm_bindgen]
pub fn get_modules() -> Result<JsValue, JsValue> {
    let modules = with_engine(|engine| engine.read(Engine::modules))?;
    to_js(&modules)
}

#[wasm_bindgen]
pub fn get_stats() -> Result<JsValue, JsValue> {
    let stats = with_engine(|engine| engine.read(Engine::stats))?;
    let result = to_js(&stats)?;
    let _ = Reflect::set(&result, &"savedMegabytes".into(), &JsValue::from(stats.saved_megabytes()));
    Ok(result)
}

#[wasm_bindgen]
pub fn get_log() -> Result<JsValue, JsValue> {
    let events = with_engine(|engine| engine.read(|e| e.activity().snapshot()))?;
    to_js(&events)
}

#[wasm_bindgen]
pub fn toggle_module(module: &str, enabled: bool) -> Result<(), JsValue> {
    let category: Category = module.parse().map_err(|e: blu_core::Error| JsValue::from_str(&e.to_string()))?;
    with_engine(|engine| engine.update(|e| e.toggle(category, enabled)))
}

/// Returns the applied preset id; unknown ids are rejected unchanged.
#[wasm_bindgen]
pub fn apply_preset(id: &str) -> Result<String, JsValue> {
    with_engine(|engine| engine.update(|e| e.apply_preset(id)))?
        .map(|preset| preset.id().to_string())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

#[wasm_bindgen]
pub fn set_enabled(enabled: bool) -> Result<(), JsValue> {
    with_engine(|engine| engine.update(|e| e.set_enabled(enabled)))
}

/// Category the URL would be blocked under, without recording anything.
#[wasm_bindgen]
pub fn classify(url: &str) -> Result<Option<String>, JsValue> {
    with_engine(|engine| {
        engine.read(|e| e.classify(Some(url)).map(|c| c.module_key().to_string()))
    })
}
