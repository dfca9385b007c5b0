//! Shared fixtures for unit tests.

use crate::bundler::settings::{Configuration, RuntimeDescriptor, describe_runtime};

pub(crate) const HELLO: &str = r#"
AppBaseName = HelloWorld
AppFriendlyName = Hello World
AppId = com.example.helloworld
AppVersionRelease = 5.4.3[2]
AppShortSummary = Says hello & waves
AppDescription = """
    HelloWorld greets the world.

    - Says hello
    - Says goodbye
"""
AppLicenseId = MIT
PublisherName = Example Team
PublisherCopyright = Copyright (C) Example Team
PublisherLinkName = Home Page
PublisherLinkUrl = https://example.com
PublisherEmail = team@example.com
StartCommand = helloworld
PrimeCategory = Development
FlatpakPlatformRuntime = org.freedesktop.Platform
FlatpakPlatformSdk = org.freedesktop.Sdk
FlatpakPlatformVersion = 23.08
FlatpakFinishArgs = --socket=wayland;--share=network
RpmAutoReq = false
RpmAutoProv = true
RpmRequires = krb5-libs;libicu
DebianRecommends = libicu
AppImageVersionOutput = true
SetupMinWindowsVersion = 10
SetupSuffixOutput = Setup
SetupVersionOutput = true
SetupCommandPrompt = Command Prompt
"#;

/// The `HELLO` document rooted at `/work/hello`.
pub(crate) fn hello() -> Configuration {
    Configuration::parse(HELLO, "/work/hello", false).expect("fixture parses")
}

/// The `HELLO` document with extra lines appended.
pub(crate) fn hello_with(extra: &str) -> Configuration {
    Configuration::parse(&format!("{}{}", HELLO, extra), "/work/hello", false)
        .expect("fixture parses")
}

pub(crate) fn linux_x64() -> RuntimeDescriptor {
    describe_runtime(Some("linux-x64"))
}

pub(crate) fn win_x64() -> RuntimeDescriptor {
    describe_runtime(Some("win-x64"))
}
