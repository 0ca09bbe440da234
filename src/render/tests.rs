use super::*;
use crate::config::Config;
use crate::hub::Sources;
use crate::spawner::tests::spawner_env;
use std::fs;
use tempfile::TempDir;

fn sample_config(userlist: &str) -> HubConfig {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("imagelist"),
        "jupyter/scipy-notebook:latest\n",
    )
    .unwrap();
    fs::write(temp_dir.path().join("custom_spawner.py"), "").unwrap();
    fs::write(temp_dir.path().join("userlist"), userlist).unwrap();

    HubConfig::assemble(
        &spawner_env(),
        &Sources::in_dir(temp_dir.path()),
        &Config::default(),
    )
    .unwrap()
}

#[test]
fn test_tree_namespaces() {
    let tree = sample_config("alice admin\nbob\ncarol hyradus\n").to_tree();

    let namespaces: Vec<&str> = tree.keys().map(String::as_str).collect();
    assert_eq!(
        namespaces,
        vec![
            "Authenticator",
            "DockerSpawner",
            "JupyterHub",
            "LabApp",
            "NativeAuthenticator",
            "Spawner",
        ]
    );

    assert_eq!(tree["JupyterHub"]["hub_ip"], json!("jupyterhub"));
    assert_eq!(tree["JupyterHub"]["hub_port"], json!(8080));
    assert_eq!(tree["JupyterHub"]["admin_access"], json!(true));
    assert_eq!(
        tree["JupyterHub"]["db_url"],
        json!("sqlite:////data/jupyterhub.sqlite")
    );
    assert_eq!(
        tree["JupyterHub"]["spawner_class"],
        json!("custom_spawner.CustomDockerSpawner")
    );
    assert_eq!(tree["Authenticator"]["admin_users"], json!(["alice", "carol"]));
    assert_eq!(
        tree["Authenticator"]["allowed_users"],
        json!(["alice", "bob", "carol"])
    );
    assert_eq!(tree["Spawner"]["default_url"], json!("/lab"));
    assert_eq!(
        tree["LabApp"]["check_for_updates_class"],
        json!("jupyterlab.NeverCheckForUpdate")
    );
}

#[test]
fn test_render_json_parses_back() {
    let tree = sample_config("alice admin\n").to_tree();
    let out = render(&tree, OutputFormat::Json).unwrap();

    let parsed: ConfigTree = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed, tree);
}

#[test]
fn test_render_toml() {
    let tree = sample_config("alice admin\n").to_tree();
    let out = render(&tree, OutputFormat::Toml).unwrap();

    let parsed: toml::Table = toml::from_str(&out).unwrap();
    let hub = parsed["JupyterHub"].as_table().unwrap();
    assert_eq!(hub["hub_port"].as_integer(), Some(8080));

    let volumes = parsed["DockerSpawner"]["volumes"].as_table().unwrap();
    assert_eq!(volumes.len(), 4);
    assert_eq!(
        volumes["/srv/hub/users/{username}"].as_str(),
        Some("/home/jovyan/work")
    );
}

#[test]
fn test_render_python() {
    let tree = sample_config("alice admin\nbob\n").to_tree();
    let out = render(&tree, OutputFormat::Python).unwrap();

    assert!(out.contains("c = get_config()"));
    assert!(out.contains("c.JupyterHub.hub_port = 8080\n"));
    assert!(out.contains("c.JupyterHub.hub_ip = \"jupyterhub\"\n"));
    assert!(out.contains("c.DockerSpawner.remove = True\n"));
    assert!(out.contains("c.NativeAuthenticator.open_signup = True\n"));
    assert!(out.contains("c.Authenticator.admin_users = {\"alice\"}\n"));
    assert!(out.contains("c.Authenticator.allowed_users = {\"alice\", \"bob\"}\n"));
    assert!(out.contains("c.DockerSpawner.extra_create_kwargs = {\"user\": \"root\"}\n"));
    assert!(out.contains("\"NB_UID\": 1000"));
}

#[test]
fn test_python_empty_set() {
    let tree = sample_config("").to_tree();
    let out = render(&tree, OutputFormat::Python).unwrap();

    assert!(out.contains("c.Authenticator.admin_users = set()\n"));
    assert!(out.contains("c.Authenticator.allowed_users = set()\n"));
}

#[test]
fn test_python_literal_escapes() {
    assert_eq!(python_literal(&json!("say \"hi\"\n")), r#""say \"hi\"\n""#);
    assert_eq!(python_literal(&Value::Null), "None");
    assert_eq!(python_literal(&json!([false, 1])), "[False, 1]");
}

#[test]
fn test_python_loads_spawner_module_by_path() {
    let config = sample_config("alice admin\n");
    let out = config.render(OutputFormat::Python).unwrap();

    assert!(out.contains("importlib.util.spec_from_file_location(module_name, filepath)"));
    assert!(out.contains("custom_spawner = _import_module(\"custom_spawner\")\n"));
    assert!(out.contains("c.JupyterHub.spawner_class = custom_spawner.CustomDockerSpawner\n"));

    let loader = out.find("_import_module(\"custom_spawner\")").unwrap();
    let get_config = out.find("c = get_config()").unwrap();
    assert!(loader < get_config);
}

#[test]
fn test_python_without_local_module_keeps_class_string() {
    let tree = sample_config("alice admin\n").to_tree();
    let out = render(&tree, OutputFormat::Python).unwrap();

    assert!(!out.contains("_import_module"));
    assert!(out.contains(
        "c.JupyterHub.spawner_class = \"custom_spawner.CustomDockerSpawner\"\n"
    ));
}

#[test]
fn test_json_keeps_class_string_with_local_module() {
    let config = sample_config("alice admin\n");
    let out = config.render(OutputFormat::Json).unwrap();
    assert!(out.contains("\"spawner_class\": \"custom_spawner.CustomDockerSpawner\""));
}
