//! Ordered fallback chains for serial-number probes.
//!
//! Each field has a list of sources. Sources are tried in order and the
//! first one that yields a non-empty value wins. A source that cannot run,
//! fails, times out or prints only a placeholder counts as "no value".

use crate::command::ProbeBackend;

/// Strings firmware vendors put in unset DMI fields.
const PLACEHOLDER_VALUES: &[&str] = &[
    "not specified",
    "not present",
    "not applicable",
    "to be filled by o.e.m.",
    "default string",
    "none",
];

/// How a value is pulled out of a source's raw output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extract {
    /// The first non-empty line.
    FirstLine,
    /// The whole content with line breaks removed (sysfs files).
    Whole,
    /// `Label: value` text; the value of the first line whose label matches.
    Field(&'static str),
    /// `wmic ... get X` table: a header line followed by the value.
    WmicValue,
    /// `"Key" = "value"` line from `ioreg` output.
    IoregProperty(&'static str),
}

impl Extract {
    /// Applies the extraction to raw output. Returns an empty string when
    /// nothing usable is found.
    #[must_use]
    pub fn apply(self, raw: &str) -> String {
        let value = match self {
            Self::FirstLine => raw
                .lines()
                .map(str::trim)
                .find(|l| !l.is_empty())
                .unwrap_or_default()
                .to_string(),
            Self::Whole => raw.lines().map(str::trim).collect::<String>(),
            Self::Field(label) => raw
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(key, _)| key.trim() == label)
                .map(|(_, value)| value.trim().to_string())
                .unwrap_or_default(),
            Self::WmicValue => {
                let lines: Vec<&str> = raw.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
                match lines.as_slice() {
                    [_, value, ..] => (*value).to_string(),
                    [single] if !single.contains(' ') => (*single).to_string(),
                    _ => String::new(),
                }
            }
            Self::IoregProperty(key) => raw
                .lines()
                .find(|l| l.contains(&format!("\"{key}\"")))
                .and_then(|l| l.split('"').nth(3))
                .unwrap_or_default()
                .to_string(),
        };

        if PLACEHOLDER_VALUES.contains(&value.to_ascii_lowercase().as_str()) {
            String::new()
        } else {
            value
        }
    }
}

/// Where a probe reads its raw data from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeSource {
    /// Run a program and extract from its stdout.
    Command {
        program: &'static str,
        args: &'static [&'static str],
        extract: Extract,
    },
    /// Read a file and extract from its content.
    File {
        path: &'static str,
        extract: Extract,
    },
}

impl ProbeSource {
    /// Reads this source through `backend`. Empty when unavailable.
    #[must_use]
    pub fn read(&self, backend: &dyn ProbeBackend) -> String {
        let raw = match self {
            Self::Command { program, args, .. } => backend.run(program, args),
            Self::File { path, .. } => backend.read_file(path),
        };
        let extract = match self {
            Self::Command { extract, .. } | Self::File { extract, .. } => *extract,
        };
        raw.map(|r| extract.apply(&r)).unwrap_or_default()
    }
}

/// Returns the first non-empty value produced by `sources`, in order.
#[must_use]
pub fn first_non_empty(sources: &[ProbeSource], backend: &dyn ProbeBackend) -> String {
    sources
        .iter()
        .map(|source| source.read(backend))
        .find(|value| !value.is_empty())
        .unwrap_or_default()
}

/// The serial-number chains for one operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformProbes {
    /// Family name, for logs.
    pub name: &'static str,
    /// Sources for the CPU serial.
    pub cpu_serial: &'static [ProbeSource],
    /// Sources for the mainboard serial.
    pub main_board_serial: &'static [ProbeSource],
}

impl PlatformProbes {
    /// Linux: DMI tables first, then kernel-exported files.
    pub const LINUX: Self = Self {
        name: "linux",
        cpu_serial: &[
            ProbeSource::Command {
                program: "dmidecode",
                args: &["-t", "processor"],
                extract: Extract::Field("ID"),
            },
            ProbeSource::File {
                path: "/proc/cpuinfo",
                extract: Extract::Field("Serial"),
            },
        ],
        main_board_serial: &[
            ProbeSource::File {
                path: "/sys/class/dmi/id/board_serial",
                extract: Extract::Whole,
            },
            ProbeSource::Command {
                program: "dmidecode",
                args: &["-t", "baseboard"],
                extract: Extract::Field("Serial Number"),
            },
            ProbeSource::File {
                path: "/sys/class/dmi/id/product_serial",
                extract: Extract::Whole,
            },
        ],
    };

    /// Windows: CIM through PowerShell, then the legacy `wmic` utility.
    pub const WINDOWS: Self = Self {
        name: "windows",
        cpu_serial: &[
            ProbeSource::Command {
                program: "powershell",
                args: &[
                    "-NoProfile",
                    "-NonInteractive",
                    "-Command",
                    "Get-CimInstance -ClassName Win32_Processor | Select-Object -ExpandProperty ProcessorId",
                ],
                extract: Extract::FirstLine,
            },
            ProbeSource::Command {
                program: "wmic",
                args: &["cpu", "get", "processorid"],
                extract: Extract::WmicValue,
            },
        ],
        main_board_serial: &[
            ProbeSource::Command {
                program: "powershell",
                args: &[
                    "-NoProfile",
                    "-NonInteractive",
                    "-Command",
                    "Get-CimInstance -ClassName Win32_BaseBoard | Select-Object -ExpandProperty SerialNumber",
                ],
                extract: Extract::FirstLine,
            },
            ProbeSource::Command {
                program: "wmic",
                args: &["baseboard", "get", "serialnumber"],
                extract: Extract::WmicValue,
            },
        ],
    };

    /// macOS: the platform expert device in the I/O registry. Apple does not
    /// expose a CPU serial, so the platform UUID stands in for it.
    pub const MACOS: Self = Self {
        name: "macos",
        cpu_serial: &[ProbeSource::Command {
            program: "ioreg",
            args: &["-rd1", "-c", "IOPlatformExpertDevice"],
            extract: Extract::IoregProperty("IOPlatformUUID"),
        }],
        main_board_serial: &[ProbeSource::Command {
            program: "ioreg",
            args: &["-rd1", "-c", "IOPlatformExpertDevice"],
            extract: Extract::IoregProperty("IOPlatformSerialNumber"),
        }],
    };

    /// Chains for the operating system this binary was built for.
    #[must_use]
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::WINDOWS
        } else if cfg!(target_os = "macos") {
            Self::MACOS
        } else {
            Self::LINUX
        }
    }
}
