//! Kind-dispatched package construction.
//!
//! [`PackageBuilder::new`] computes and validates everything up front: the
//! layout, icons, macros and tool availability. Nothing touches the
//! filesystem until [`PackageBuilder::create`] stages the build tree and
//! [`PackageBuilder::build_package`] runs the packaging tool.

use super::{
    BuildLayout, PackageKind,
    linux::{self, appimage, debian, flatpak, freedesktop, rpm},
    windows::setup,
};
use crate::bundler::{
    error::{Context, Error, ErrorExt, Result},
    macros::{MacroTable, changelog},
    resources::{AssetLocator, IconSet},
    settings::{Arch, BuildOptions, Configuration, RuntimeDescriptor},
    utils::ops::Operations,
};
use chrono::{DateTime, Utc};
use std::{
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
};

/// One external command line plus the variables it needs.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize)]
pub struct PackageCommand {
    pub command: String,
    pub env: Vec<(String, String)>,
}

impl PackageCommand {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            env: Vec::new(),
        }
    }

    /// Adds an environment variable for this command only.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

impl fmt::Display for PackageCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.env {
            write!(f, "{}={} ", key, value)?;
        }
        f.write_str(&self.command)
    }
}

/// Everything a build would do, without doing it.
#[derive(Clone, Debug, serde::Serialize)]
pub struct BuildPlan {
    pub kind: PackageKind,
    pub runtime: RuntimeDescriptor,
    pub package_arch: String,
    pub output: PathBuf,
    pub layout: BuildLayout,
    pub icons: IconSet,
    pub manifest: Option<PathBuf>,
    pub commands: Vec<PackageCommand>,
    pub macros: BTreeMap<String, String>,
    pub warnings: Vec<String>,
}

/// A tool the kind needs but this host cannot provide.
#[derive(Clone, Debug)]
struct MissingTool {
    tool: String,
    reason: String,
}

impl MissingTool {
    fn new(tool: &str, reason: impl Into<String>) -> Self {
        Self {
            tool: tool.to_string(),
            reason: reason.into(),
        }
    }
}

/// Builds one package kind for one configuration and runtime.
#[derive(Debug)]
pub struct PackageBuilder<'a> {
    conf: &'a Configuration,
    runtime: RuntimeDescriptor,
    layout: BuildLayout,
    icons: IconSet,
    macros: MacroTable,
    built: DateTime<Utc>,
    tool: Option<PathBuf>,
    missing: Option<MissingTool>,
}

impl<'a> PackageBuilder<'a> {
    /// Validates and computes a build.
    ///
    /// Non-fatal problems (missing tools, runtime and kind mismatch, uncertain
    /// architecture) are logged and appended to `warnings`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArchitecture`] if the kind cannot target the runtime
    /// - [`Error::IconPathError`] if AppImage or Setup has no usable icon,
    ///   even among the default assets
    /// - [`Error::Construction`] if a required layout path is missing
    pub fn new(
        conf: &'a Configuration,
        runtime: &RuntimeDescriptor,
        kind: PackageKind,
        options: &BuildOptions,
        assets: &AssetLocator,
        warnings: &mut Vec<String>,
    ) -> Result<Self> {
        let layout = BuildLayout::new(conf, runtime, kind, options)?;

        if kind.targets_linux() && layout.usr_bin().is_none() {
            return Err(Error::Construction(format!("{} layout has no usr/bin", kind)));
        }

        let icons = resolve_icons(conf, kind, &layout, assets)?;

        let changelog_xml = match conf.app_change_file() {
            Some(path) => {
                let text = std::fs::read_to_string(path).fs_context("reading change file", path)?;
                changelog::to_appstream(&text)
            }
            None => String::new(),
        };

        let built = options.build_time();
        let macros = MacroTable::build(conf, runtime, &layout, &changelog_xml, built);
        macros.verify_complete()?;

        let (tool, missing) = locate_tools(kind, assets);

        let mut warn = |message: String| {
            log::warn!("{}", message);
            warnings.push(message);
        };
        if kind.targets_linux() && !runtime.is_linux() {
            warn(format!("{} targets Linux but runtime {} is not a Linux runtime", kind, runtime.id()));
        }
        if kind.targets_windows() && !runtime.is_windows() {
            warn(format!("{} targets Windows but runtime {} is not a Windows runtime", kind, runtime.id()));
        }
        if runtime.arch_uncertain() {
            warn(format!(
                "Architecture of runtime {} is uncertain, building for {}",
                runtime.id(),
                layout.package_arch()
            ));
        }
        if let Some(gap) = &missing {
            warn(format!("{} is not available: {}", gap.tool, gap.reason));
        }

        log::debug!(
            "Prepared {} build of {} in {}",
            kind,
            conf.app_id(),
            layout.package_root().display()
        );

        Ok(Self {
            conf,
            runtime: runtime.clone(),
            layout,
            icons,
            macros,
            built,
            tool,
            missing,
        })
    }

    pub fn kind(&self) -> PackageKind {
        self.layout.kind()
    }

    pub fn package_arch(&self) -> &str {
        self.layout.package_arch()
    }

    pub fn output_file_name(&self) -> &str {
        self.layout.output_name()
    }

    pub fn layout(&self) -> &BuildLayout {
        &self.layout
    }

    /// The single representative icon, if any.
    pub fn primary_icon(&self) -> Option<&Path> {
        self.icons.primary()
    }

    pub fn macros(&self) -> &MacroTable {
        &self.macros
    }

    /// Manifest path and text, for kinds that have one.
    ///
    /// The RPM spec lists the build tree as it currently exists.
    pub fn manifest(&self) -> Result<Option<(PathBuf, String)>> {
        let Some(path) = self.layout.manifest_path() else {
            return Ok(None);
        };
        let text = match self.kind() {
            PackageKind::Flatpak => flatpak::manifest(self.conf, &self.layout),
            PackageKind::Rpm => rpm::spec(self.conf, &self.layout)?,
            PackageKind::Deb => debian::control(self.conf, &self.layout),
            PackageKind::Setup => setup::script(self.conf, &self.layout, self.icons.primary()),
            PackageKind::AppImage | PackageKind::Zip => return Ok(None),
        };
        Ok(Some((path.to_path_buf(), text)))
    }

    /// External commands that turn the staged tree into the package, in order.
    ///
    /// Zip has none: it is archived directly.
    pub fn package_commands(&self) -> Vec<PackageCommand> {
        match self.kind() {
            PackageKind::AppImage => {
                let tool = self
                    .tool
                    .as_deref()
                    .unwrap_or_else(|| Path::new("appimagetool"));
                vec![appimage::command(self.conf, &self.layout, tool)]
            }
            PackageKind::Flatpak => flatpak::commands(self.conf, &self.layout),
            PackageKind::Rpm => vec![rpm::command(&self.layout, self.built)],
            PackageKind::Deb => vec![debian::command(&self.layout)],
            PackageKind::Setup => vec![setup::command(&self.layout)],
            PackageKind::Zip => Vec::new(),
        }
    }

    /// Desktop entry and metainfo text with macros expanded.
    ///
    /// Uses `DesktopFile` and `MetaFile` when configured, the built-in
    /// templates otherwise. Both are empty for Setup and Zip.
    pub fn expand_templates(&self) -> Result<(String, String)> {
        let kind = self.kind();
        let desktop = freedesktop::load_template(
            kind,
            self.conf.desktop_file(),
            freedesktop::DESKTOP_TEMPLATE,
        )?;
        let metainfo = freedesktop::load_template(
            kind,
            self.conf.meta_file(),
            freedesktop::METAINFO_TEMPLATE,
        )?;
        Ok((
            self.macros.expand(&desktop, false),
            self.macros.expand(&metainfo, true),
        ))
    }

    /// Populates the build tree.
    ///
    /// Safe to run again over an already populated tree: every write
    /// replaces its target.
    pub fn create(&self, desktop: &str, metainfo: &str, ops: &dyn Operations) -> Result<()> {
        let layout = &self.layout;
        let conf = self.conf;

        ops.create_dir(layout.build_root())?;
        ops.create_dir(layout.app_bin())?;
        for dir in [
            layout.usr_bin(),
            layout.usr_share(),
            layout.metainfo_dir(),
            layout.applications_dir(),
            layout.icons_dir(),
        ]
        .into_iter()
        .flatten()
        {
            ops.create_dir(dir)?;
        }

        if let Some(path) = layout.desktop_path().filter(|_| !desktop.trim().is_empty()) {
            ops.write_file(path, desktop)?;
        }
        if let Some(path) = layout.metainfo_path().filter(|_| !metainfo.trim().is_empty()) {
            ops.write_file(path, metainfo)?;
        }

        for icon in self.icons.entries() {
            ops.copy_file(&icon.source, &icon.destination)
                .with_context(|| format!("failed to install icon {}", icon.source.display()))?;
        }

        for file in [conf.app_license_file(), conf.app_change_file()].into_iter().flatten() {
            if let Some(name) = file.file_name() {
                ops.copy_file(file, &layout.app_bin().join(name))?;
            }
        }

        if let (Some(launcher), Some(exec)) = (layout.launcher_path(), layout.install_exec()) {
            ops.write_file(launcher, &linux::launcher_script(exec))?;
            ops.execute(&format!("chmod a+x {}", linux::quoted(launcher)), &[])?;
        }

        match self.kind() {
            PackageKind::AppImage => {
                if !desktop.trim().is_empty() {
                    ops.write_file(&appimage::root_desktop(layout, conf.app_id()), desktop)?;
                }
                if !metainfo.trim().is_empty() {
                    ops.write_file(&appimage::root_metainfo(layout, conf.app_id()), metainfo)?;
                }
                if let Some(icon) = self.icons.primary() {
                    ops.copy_file(icon, &appimage::root_icon(layout, conf.app_id(), icon))?;
                }
                ops.symlink(
                    &appimage::app_run_target(conf),
                    &layout.build_root().join("AppRun"),
                )?;
            }
            PackageKind::Setup => {
                if let Some((icon, name)) = self.icons.primary().and_then(|i| i.file_name().map(|n| (i, n))) {
                    ops.copy_file(icon, &layout.app_bin().join(name))?;
                }
            }
            _ => {}
        }

        if let Some((path, text)) = self.manifest()? {
            ops.write_file(&path, &text)?;
        }

        log::debug!("Populated {}", layout.build_root().display());
        Ok(())
    }

    /// Runs the packaging commands and places the package at the output path.
    ///
    /// # Errors
    ///
    /// - [`Error::ToolUnavailable`] if a required tool was not found
    /// - [`Error::CommandExit`] if a tool fails
    /// - [`Error::OutputNotFound`] if rpmbuild produced zero or several packages
    pub fn build_package(&self, ops: &dyn Operations) -> Result<()> {
        if let Some(gap) = &self.missing {
            return Err(Error::ToolUnavailable {
                tool: gap.tool.clone(),
                reason: gap.reason.clone(),
            });
        }

        let layout = &self.layout;
        ops.create_dir(layout.output_dir())?;

        if self.kind() == PackageKind::Zip {
            log::info!("Archiving {}", layout.build_root().display());
            return ops.zip_dir(layout.build_root(), layout.output_path());
        }

        for cmd in self.package_commands() {
            log::info!("Running {}", cmd);
            ops.execute(&cmd.command, &cmd.env)?;
        }

        if self.kind() == PackageKind::Rpm {
            let produced = rpm::locate_output(&rpm::rpms_dir(layout))?;
            log::debug!("rpmbuild produced {}", produced.display());
            ops.copy_file(&produced, layout.output_path())?;
        }
        Ok(())
    }

    /// Describes the build without touching the filesystem.
    pub fn plan(&self, warnings: &[String]) -> Result<BuildPlan> {
        Ok(BuildPlan {
            kind: self.kind(),
            runtime: self.runtime.clone(),
            package_arch: self.package_arch().to_string(),
            output: self.layout.output_path().to_path_buf(),
            layout: self.layout.clone(),
            icons: self.icons.clone(),
            manifest: self.manifest()?.map(|(path, _)| path),
            commands: self.package_commands(),
            macros: self
                .macros
                .iter()
                .map(|(id, value)| (id.name().to_string(), value.to_string()))
                .collect(),
            warnings: warnings.to_vec(),
        })
    }
}

/// Icons from the configuration, falling back to the default assets.
fn resolve_icons(
    conf: &Configuration,
    kind: PackageKind,
    layout: &BuildLayout,
    assets: &AssetLocator,
) -> Result<IconSet> {
    let needs_primary = matches!(kind, PackageKind::AppImage | PackageKind::Setup);
    let mut icons = IconSet::resolve(conf.icon_files(), kind, layout.build_root(), conf.app_id());

    if conf.icon_files().is_empty() || (needs_primary && icons.primary().is_none()) {
        let defaults = assets.default_icons();
        if !defaults.is_empty() {
            log::debug!("Using default icons from {}", assets.root().display());
            icons = IconSet::resolve(&defaults, kind, layout.build_root(), conf.app_id());
        }
    }

    if needs_primary && icons.primary().is_none() {
        return Err(Error::IconPathError);
    }
    Ok(icons)
}

/// Finds the primary tool for `kind`, or why it is unavailable.
fn locate_tools(kind: PackageKind, assets: &AssetLocator) -> (Option<PathBuf>, Option<MissingTool>) {
    let required: &[&str] = match kind {
        PackageKind::AppImage => return locate_appimagetool(assets),
        PackageKind::Flatpak => &["flatpak-builder", "flatpak"],
        PackageKind::Rpm => &["rpmbuild"],
        PackageKind::Deb => &["dpkg-deb"],
        PackageKind::Setup => &["iscc"],
        PackageKind::Zip => &[],
    };

    let mut primary = None;
    for name in required {
        match assets.find_tool(name) {
            Some(path) => {
                primary.get_or_insert(path);
            }
            None => return (None, Some(MissingTool::new(name, "not found on PATH"))),
        }
    }
    (primary, None)
}

fn locate_appimagetool(assets: &AssetLocator) -> (Option<PathBuf>, Option<MissingTool>) {
    const TOOL: &str = "appimagetool";

    if !cfg!(target_os = "linux") {
        return (None, Some(MissingTool::new(TOOL, "AppImage can only be built on Linux")));
    }

    if let Ok(embedded) = assets.appimagetool(Arch::host())
        && embedded.is_file()
    {
        return (Some(embedded), None);
    }

    match assets.find_tool(TOOL) {
        Some(path) => (Some(path), None),
        None => (
            None,
            Some(MissingTool::new(
                TOOL,
                format!("no embedded build for {} and not found on PATH", Arch::host()),
            )),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::{
        testing,
        utils::ops::{Recorded, RecordingOperations},
    };

    struct Fixture {
        _dir: tempfile::TempDir,
        assets: AssetLocator,
        options: BuildOptions,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let icons = dir.path().join("assets/icons");
        std::fs::create_dir_all(&icons).unwrap();
        for name in ["generic.svg", "generic.64.png", "generic.ico"] {
            std::fs::write(icons.join(name), "icon").unwrap();
        }
        let bin = dir.path().join("bin");
        std::fs::create_dir_all(&bin).unwrap();

        Fixture {
            assets: AssetLocator::new(dir.path().join("assets")).with_search_path(bin.as_os_str()),
            options: BuildOptions::default().work_root(dir.path().join("work")),
            _dir: dir,
        }
    }

    #[cfg(unix)]
    fn install_tool(fixture: &Fixture, name: &str) {
        use std::os::unix::fs::PermissionsExt;
        let bin = fixture.options.work_root_dir().parent().unwrap().join("bin");
        let path = bin.join(name);
        std::fs::write(&path, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn test_missing_tool_is_a_warning_until_build() {
        let f = fixture();
        let conf = testing::hello();
        let mut warnings = Vec::new();
        let builder = PackageBuilder::new(
            &conf,
            &testing::linux_x64(),
            PackageKind::Deb,
            &f.options,
            &f.assets,
            &mut warnings,
        )
        .unwrap();

        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("dpkg-deb"));

        let ops = RecordingOperations::new();
        let err = builder.build_package(&ops).unwrap_err();
        assert!(matches!(err, Error::ToolUnavailable { ref tool, .. } if tool == "dpkg-deb"));
        assert!(ops.calls().is_empty());
    }

    #[test]
    fn test_runtime_mismatch_warns() {
        let f = fixture();
        let conf = testing::hello();
        let mut warnings = Vec::new();
        PackageBuilder::new(
            &conf,
            &testing::win_x64(),
            PackageKind::Zip,
            &f.options,
            &f.assets,
            &mut warnings,
        )
        .unwrap();
        assert!(warnings.is_empty());

        PackageBuilder::new(
            &conf,
            &testing::win_x64(),
            PackageKind::Rpm,
            &f.options,
            &f.assets,
            &mut warnings,
        )
        .unwrap();
        assert!(warnings.iter().any(|w| w.contains("not a Linux runtime")));
    }

    #[test]
    fn test_setup_without_any_icon_fails() {
        let dir = tempfile::tempdir().unwrap();
        let assets = AssetLocator::new(dir.path()).with_search_path(dir.path().as_os_str());
        let conf = testing::hello();
        let err = PackageBuilder::new(
            &conf,
            &testing::win_x64(),
            PackageKind::Setup,
            &BuildOptions::default().work_root(dir.path()),
            &assets,
            &mut Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::IconPathError));
    }

    #[test]
    fn test_default_icons_fill_in() {
        let f = fixture();
        let conf = testing::hello();
        let builder = PackageBuilder::new(
            &conf,
            &testing::win_x64(),
            PackageKind::Setup,
            &f.options,
            &f.assets,
            &mut Vec::new(),
        )
        .unwrap();
        assert!(builder.primary_icon().unwrap().ends_with("generic.ico"));
    }

    #[test]
    fn test_deb_create_stages_tree() {
        let f = fixture();
        let conf = testing::hello();
        let builder = PackageBuilder::new(
            &conf,
            &testing::linux_x64(),
            PackageKind::Deb,
            &f.options,
            &f.assets,
            &mut Vec::new(),
        )
        .unwrap();

        let (desktop, metainfo) = builder.expand_templates().unwrap();
        assert!(desktop.contains("Exec=/opt/com.example.helloworld/HelloWorld\n"));
        assert!(metainfo.contains("<summary>Says hello &amp; waves</summary>"));
        assert!(metainfo.contains("<li>Says hello</li>"));

        let ops = RecordingOperations::new();
        builder.create(&desktop, &metainfo, &ops).unwrap();

        let layout = builder.layout();
        assert_eq!(ops.written(layout.desktop_path().unwrap()).as_deref(), Some(desktop.as_str()));

        let launcher = ops.written(layout.launcher_path().unwrap()).unwrap();
        assert!(launcher.contains("exec \"/opt/com.example.helloworld/HelloWorld\" \"$@\""));
        assert!(ops.commands().iter().any(|c| c.starts_with("chmod a+x ")));

        let control = ops.written(layout.manifest_path().unwrap()).unwrap();
        assert!(control.starts_with("Package: helloworld\n"));

        let icons = ops
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Recorded::CopyFile(_, to) if to.starts_with(layout.icons_dir().unwrap())))
            .count();
        assert_eq!(icons, 2);
    }

    #[test]
    fn test_appimage_create_duplicates_root_files() {
        let f = fixture();
        let conf = testing::hello();
        let builder = PackageBuilder::new(
            &conf,
            &testing::linux_x64(),
            PackageKind::AppImage,
            &f.options,
            &f.assets,
            &mut Vec::new(),
        )
        .unwrap();

        let ops = RecordingOperations::new();
        builder.create("[Desktop Entry]\n", "<component/>\n", &ops).unwrap();

        let root = builder.layout().build_root();
        assert!(ops.written(&root.join("com.example.helloworld.desktop")).is_some());
        assert!(ops.written(&root.join("com.example.helloworld.appdata.xml")).is_some());
        assert!(ops.calls().contains(&Recorded::Symlink(
            PathBuf::from("usr/bin/HelloWorld"),
            root.join("AppRun")
        )));
        assert!(ops.calls().iter().any(
            |c| matches!(c, Recorded::CopyFile(_, to) if *to == root.join("com.example.helloworld.svg"))
        ));
    }

    #[test]
    fn test_zip_build_archives_publish_dir() {
        let f = fixture();
        let conf = testing::hello();
        let builder = PackageBuilder::new(
            &conf,
            &testing::linux_x64(),
            PackageKind::Zip,
            &f.options,
            &f.assets,
            &mut Vec::new(),
        )
        .unwrap();

        assert!(builder.package_commands().is_empty());
        let ops = RecordingOperations::new();
        builder.build_package(&ops).unwrap();

        let layout = builder.layout();
        assert_eq!(
            ops.calls().last(),
            Some(&Recorded::ZipDir(
                layout.build_root().to_path_buf(),
                layout.output_path().to_path_buf()
            ))
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_rpm_build_requires_single_output() {
        let f = fixture();
        install_tool(&f, "rpmbuild");
        let conf = testing::hello();
        let mut warnings = Vec::new();
        let builder = PackageBuilder::new(
            &conf,
            &testing::linux_x64(),
            PackageKind::Rpm,
            &f.options,
            &f.assets,
            &mut warnings,
        )
        .unwrap();
        assert!(warnings.is_empty(), "{:?}", warnings);

        let ops = RecordingOperations::new();
        let err = builder.build_package(&ops).unwrap_err();
        assert!(matches!(err, Error::OutputNotFound { found: 0, .. }));

        let commands = ops.commands();
        assert_eq!(commands.len(), 1);
        assert!(commands[0].starts_with("rpmbuild -bb "));
    }

    #[cfg(unix)]
    #[test]
    fn test_flatpak_runs_both_commands_in_order() {
        let f = fixture();
        install_tool(&f, "flatpak-builder");
        install_tool(&f, "flatpak");
        let conf = testing::hello();
        let builder = PackageBuilder::new(
            &conf,
            &testing::linux_x64(),
            PackageKind::Flatpak,
            &f.options,
            &f.assets,
            &mut Vec::new(),
        )
        .unwrap();

        let ops = RecordingOperations::new();
        builder.build_package(&ops).unwrap();
        let commands = ops.commands();
        assert_eq!(commands.len(), 2);
        assert!(commands[0].starts_with("flatpak-builder "));
        assert!(commands[1].starts_with("flatpak build-bundle "));
    }

    #[test]
    fn test_plan_lists_macros_and_commands() {
        let f = fixture();
        let conf = testing::hello();
        let builder = PackageBuilder::new(
            &conf,
            &testing::linux_x64(),
            PackageKind::Deb,
            &f.options,
            &f.assets,
            &mut Vec::new(),
        )
        .unwrap();

        let plan = builder.plan(&["careful".to_string()]).unwrap();
        assert_eq!(plan.package_arch, "amd64");
        assert_eq!(plan.macros.get("BUILD_ARCH").map(String::as_str), Some("amd64"));
        assert_eq!(plan.macros.len(), 30);
        assert_eq!(plan.commands.len(), 1);
        assert_eq!(plan.warnings, vec!["careful".to_string()]);
        assert!(plan.manifest.unwrap().ends_with("DEBIAN/control"));
    }

    #[test]
    fn test_command_display_shows_env() {
        let cmd = PackageCommand::new("appimagetool a b").env("ARCH", "x86_64");
        assert_eq!(cmd.to_string(), "ARCH=x86_64 appimagetool a b");
    }
}
