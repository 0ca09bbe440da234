use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const SPAWNER_ENV: [(&str, &str); 10] = [
    ("NOTEBOOK_SPAWN_CMD", "start-singleuser.sh"),
    ("DOCKER_NETWORK_NAME", "jupyterhub-network"),
    ("NOTEBOOK_USERS_WORK_DIR", "/home/jovyan/work"),
    ("HOST_USERS_WORK_BASEDIR", "/srv/hub/users"),
    ("NOTEBOOK_USERS_SHARED_DIR", "/home/jovyan/shared"),
    ("HOST_USERS_SHARED_DIR", "/srv/hub/shared"),
    ("NOTEBOOK_DATA_DIR", "/home/jovyan/data"),
    ("HOST_DATA_DIR", "/srv/hub/data"),
    ("NOTEBOOK_ISISDATA_DIR", "/isis/data"),
    ("HOST_ISISDATA_DIR", "/srv/isisdata"),
];

// Start from an empty environment so the caller's variables and settings do not leak in
fn hubconf(config_dir: &Path) -> Result<Command> {
    let mut cmd = Command::cargo_bin("hubconf")?;
    cmd.env_clear()
        .env("HOME", config_dir)
        .env("XDG_CONFIG_HOME", config_dir)
        .current_dir(config_dir);
    Ok(cmd)
}

fn with_spawner_env(cmd: &mut Command) -> &mut Command {
    for (key, value) in SPAWNER_ENV {
        cmd.env(key, value);
    }
    cmd
}

fn write_spawner_module(dir: &Path) -> Result<()> {
    fs::write(
        dir.join("custom_spawner.py"),
        "from dockerspawner import DockerSpawner\n\nclass CustomDockerSpawner(DockerSpawner):\n    pass\n",
    )?;
    Ok(())
}

fn write_lists(dir: &Path) -> Result<()> {
    write_spawner_module(dir)?;
    fs::write(dir.join("imagelist"), "jupyter/scipy-notebook:latest\n")?;
    fs::write(dir.join("userlist"), "alice admin\nbob\ncarol hyradus\n")?;
    Ok(())
}

#[test]
fn test_version_subcommand() -> Result<()> {
    let mut cmd = Command::cargo_bin("hubconf")?;
    cmd.arg("version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("hubconf 0.1.0"));
    Ok(())
}

#[test]
fn test_help_command() -> Result<()> {
    let mut cmd = Command::cargo_bin("hubconf")?;
    cmd.arg("--help");
    cmd.assert().success().stdout(predicate::str::contains(
        "Assembles JupyterHub deployment configuration from the environment",
    ));
    Ok(())
}

#[test]
fn test_render_json_to_stdout() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_lists(temp_dir.path())?;

    let mut cmd = hubconf(temp_dir.path())?;
    with_spawner_env(&mut cmd).arg("render");
    let output = cmd.assert().success().get_output().stdout.clone();

    let tree: serde_json::Value = serde_json::from_slice(&output)?;
    assert_eq!(tree["JupyterHub"]["hub_port"], 8080);
    assert_eq!(
        tree["JupyterHub"]["authenticator_class"],
        "nativeauthenticator.NativeAuthenticator"
    );
    assert_eq!(
        tree["Authenticator"]["admin_users"],
        serde_json::json!(["alice", "carol"])
    );
    assert_eq!(
        tree["DockerSpawner"]["volumes"]
            .as_object()
            .map(|v| v.len()),
        Some(4)
    );
    Ok(())
}

#[test]
fn test_render_python_to_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_lists(temp_dir.path())?;
    let output_path = temp_dir.path().join("jupyterhub_config.py");

    let mut cmd = hubconf(temp_dir.path())?;
    with_spawner_env(&mut cmd)
        .env("OAUTHENTICATOR", "GitLab")
        .arg("render")
        .arg("--format")
        .arg("python")
        .arg("--output")
        .arg(&output_path);
    cmd.assert().success().stdout(predicate::str::is_empty());

    let content = fs::read_to_string(&output_path)?;
    assert!(content.contains(
        "c.JupyterHub.authenticator_class = \"oauthenticator.gitlab.GitLabOAuthenticator\""
    ));
    assert!(content.contains("custom_spawner = _import_module(\"custom_spawner\")"));
    assert!(content.contains("c.JupyterHub.spawner_class = custom_spawner.CustomDockerSpawner"));
    assert!(content.contains("c.Spawner.default_url = \"/lab\""));
    Ok(())
}

#[test]
fn test_missing_oauth_var_fails() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_lists(temp_dir.path())?;

    let mut cmd = hubconf(temp_dir.path())?;
    with_spawner_env(&mut cmd)
        .env("OAUTHENTICATOR", "github")
        .env("OAUTH_CALLBACK_URL", "https://hub.example.org/hub/oauth_callback")
        .env("OAUTH_CLIENT_ID", "hub")
        .arg("render");

    cmd.assert().failure().stderr(predicate::str::contains(
        "OAUTH_CLIENT_SECRET environment variable is required for GitHub",
    ));
    Ok(())
}

#[test]
fn test_check_summary() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_lists(temp_dir.path())?;

    let mut cmd = hubconf(temp_dir.path())?;
    with_spawner_env(&mut cmd)
        .env("JUPYTERHUB_ADMIN", "operator")
        .arg("check");

    cmd.assert().success().stdout(predicate::str::contains(
        "ok: authenticator=Native allowed_users=3 admin_users=3 images=1",
    ));
    Ok(())
}

#[test]
fn test_env_file_supplies_variables() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_lists(temp_dir.path())?;

    let env_file: String = SPAWNER_ENV
        .iter()
        .map(|(key, value)| format!("{}={}\n", key, value))
        .collect();
    fs::write(temp_dir.path().join(".env"), env_file)?;

    let mut cmd = hubconf(temp_dir.path())?;
    cmd.arg("check").arg("--env-file").arg(".env");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("authenticator=Native"));
    Ok(())
}

#[test]
fn test_user_list_policy_fail_fast() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_spawner_module(temp_dir.path())?;
    fs::write(
        temp_dir.path().join("imagelist"),
        "jupyter/scipy-notebook:latest\n",
    )?;

    let mut cmd = hubconf(temp_dir.path())?;
    with_spawner_env(&mut cmd).arg("check");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("allowed_users=1 admin_users=1"));

    let mut cmd = hubconf(temp_dir.path())?;
    with_spawner_env(&mut cmd)
        .arg("check")
        .arg("--user-list-policy")
        .arg("fail-fast");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("failed to read user list"));
    Ok(())
}

#[test]
fn test_missing_image_list_fails() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_spawner_module(temp_dir.path())?;

    let mut cmd = hubconf(temp_dir.path())?;
    with_spawner_env(&mut cmd).arg("render");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("failed to read image list"));
    Ok(())
}

#[test]
fn test_missing_spawner_module_fails() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_lists(temp_dir.path())?;
    fs::remove_file(temp_dir.path().join("custom_spawner.py"))?;

    for subcommand in ["check", "render"] {
        let mut cmd = hubconf(temp_dir.path())?;
        with_spawner_env(&mut cmd).arg(subcommand);
        cmd.assert().failure().stderr(
            predicate::str::contains("spawner module").and(predicate::str::contains("custom_spawner.py")),
        );
    }
    Ok(())
}

#[test]
fn test_empty_spawner_var_is_reported_as_empty() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_lists(temp_dir.path())?;

    let mut cmd = hubconf(temp_dir.path())?;
    with_spawner_env(&mut cmd)
        .env("HOST_DATA_DIR", "")
        .arg("check");
    cmd.assert().failure().stderr(predicate::str::contains(
        "HOST_DATA_DIR environment variable must not be empty",
    ));
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_non_utf8_variable_is_ignored() -> Result<()> {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let temp_dir = TempDir::new()?;
    write_lists(temp_dir.path())?;

    let mut cmd = hubconf(temp_dir.path())?;
    with_spawner_env(&mut cmd)
        .env("UNRELATED_LOCALE_JUNK", OsStr::from_bytes(b"caf\xe9"))
        .arg("check");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("authenticator=Native"));
    Ok(())
}

#[cfg(target_os = "linux")]
#[test]
fn test_user_settings_file_is_read_from_config_home() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_lists(temp_dir.path())?;
    let settings_dir = temp_dir.path().join("hubconf");
    fs::create_dir_all(&settings_dir)?;
    fs::write(settings_dir.join("config.toml"), "format = \"toml\"\n")?;

    let mut cmd = hubconf(temp_dir.path())?;
    with_spawner_env(&mut cmd).arg("render");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("[JupyterHub]"));
    Ok(())
}
