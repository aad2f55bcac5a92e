// src/config/merge.rs

//! Layering of [`ScriptOptions`].
//!
//! A more specific layer (a script object) overrides a more general one (the
//! top-level options) key by key. Lists are replaced wholesale; maps (`env`
//! and map-form `allow`) are merged entry by entry with the overlay winning.

use std::collections::BTreeMap;

use crate::config::options::{AllowFlags, ScriptOptions};

impl ScriptOptions {
    /// Return a new set of options where every key set in `overlay` replaces
    /// the corresponding key of `self`.
    pub fn merged_with(&self, overlay: &ScriptOptions) -> ScriptOptions {
        ScriptOptions {
            env: merge_maps(self.env.as_ref(), overlay.env.as_ref()),
            allow: merge_allow(self.allow.as_ref(), overlay.allow.as_ref()),
            importmap: pick(&self.importmap, &overlay.importmap),
            lock: pick(&self.lock, &overlay.lock),
            cert: pick(&self.cert, &overlay.cert),
            log: pick(&self.log, &overlay.log),
            tsconfig: pick(&self.tsconfig, &overlay.tsconfig),
            inspect: pick(&self.inspect, &overlay.inspect),
            inspect_brk: pick(&self.inspect_brk, &overlay.inspect_brk),
            unstable: pick(&self.unstable, &overlay.unstable),
            no_check: pick(&self.no_check, &overlay.no_check),
            watch: pick(&self.watch, &overlay.watch),
            stdin: pick(&self.stdin, &overlay.stdin),
            stdout: pick(&self.stdout, &overlay.stdout),
            stderr: pick(&self.stderr, &overlay.stderr),
        }
    }
}

fn pick<T: Clone>(base: &Option<T>, overlay: &Option<T>) -> Option<T> {
    overlay.clone().or_else(|| base.clone())
}

fn merge_maps<V: Clone>(
    base: Option<&BTreeMap<String, V>>,
    overlay: Option<&BTreeMap<String, V>>,
) -> Option<BTreeMap<String, V>> {
    match (base, overlay) {
        (Some(base), Some(overlay)) => {
            let mut merged = base.clone();
            merged.extend(overlay.iter().map(|(k, v)| (k.clone(), v.clone())));
            Some(merged)
        }
        (base, overlay) => overlay.or(base).cloned(),
    }
}

fn merge_allow(base: Option<&AllowFlags>, overlay: Option<&AllowFlags>) -> Option<AllowFlags> {
    match (base, overlay) {
        (Some(AllowFlags::Map(base)), Some(AllowFlags::Map(overlay))) => {
            merge_maps(Some(base), Some(overlay)).map(AllowFlags::Map)
        }
        (base, overlay) => overlay.or(base).cloned(),
    }
}
