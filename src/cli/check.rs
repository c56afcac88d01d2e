//! `check` command: the guard that runs before the site build.
//!
//! Configuration has already been validated by the time this runs; the
//! remaining check renders the runtime scripts exactly as `run` would.

use anyhow::Result;

use crate::config::SiteConfig;
use crate::log;
use crate::relocate::ScriptInjector;

pub fn check_config(config: &SiteConfig) -> Result<()> {
    let relocate = &config.relocate;
    if !relocate.enable {
        log!("check"; "relocation disabled, nothing to check");
        return Ok(());
    }

    let injector = ScriptInjector::new(relocate)?;

    log!(
        "check";
        "{}: prefix `{}` (site path `/{}/`) in {}, {} bytes of runtime per page",
        config.root_relative(&config.config_path).display(),
        relocate.prefix,
        config.site.prefix(),
        config.root_relative(config.output_dir()).display(),
        injector.injected_len()
    );
    log!("check"; "ok");
    Ok(())
}
