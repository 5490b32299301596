use std::fs;
use std::path::Path;
use uuid::Uuid;

static MACHINE_ID_FILES: [&str; 2] = ["/etc/machine-id", "/var/lib/dbus/machine-id"];

/// Stable identifier of this device: `configured` if set, else the machine id,
/// else a random UUID.
pub fn device_id(configured: Option<&str>) -> String {
    if let Some(id) = configured.map(str::trim).filter(|id| !id.is_empty()) {
        return id.to_string();
    }
    let paths = MACHINE_ID_FILES.iter().map(Path::new);
    match read_first_id(paths) {
        Some(id) => id,
        None => {
            let id = Uuid::new_v4().simple().to_string();
            log::warn!("No machine id found, using random device id {id}");
            id
        }
    }
}

fn read_first_id<'a>(paths: impl IntoIterator<Item = &'a Path>) -> Option<String> {
    paths.into_iter().find_map(|path| {
        let content = fs::read_to_string(path).ok()?;
        let id = content.trim();
        (!id.is_empty()).then(|| id.to_string())
    })
}
