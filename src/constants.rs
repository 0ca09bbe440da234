/// Hub process constants
pub mod hub {
    /// Hostname the hub binds to inside the compose network
    pub const IP: &str = "jupyterhub";

    /// Port the hub API listens on
    pub const PORT: u16 = 8080;

    /// Persistent cookie secret location
    pub const COOKIE_SECRET_FILE: &str = "/data/jupyterhub_cookie_secret";

    /// Hub state database
    pub const DB_URL: &str = "sqlite:////data/jupyterhub.sqlite";

    /// Landing page after login
    pub const DEFAULT_URL: &str = "/lab";

    /// JupyterLab update check that never checks
    pub const CHECK_FOR_UPDATES_CLASS: &str = "jupyterlab.NeverCheckForUpdate";
}

/// Spawner constants
pub mod spawner {
    /// Spawner class loaded by the hub
    pub const CLASS: &str = "custom_spawner.CustomDockerSpawner";

    /// Notebook directory used when NOTEBOOK_DIR is unset
    pub const DEFAULT_NOTEBOOK_DIR: &str = "/home/jovyan";

    /// Placeholder the spawner expands per user
    pub const USERNAME_PLACEHOLDER: &str = "{username}";

    /// Container user passed through extra_create_kwargs
    pub const CREATE_USER: &str = "root";

    /// Notebook user UID inside the container
    pub const NB_UID: u32 = 1000;

    /// Notebook user GID inside the container
    pub const NB_GID: u32 = 100;
}

/// User list constants
pub mod users {
    /// Identity used when the user list cannot be read
    pub const FALLBACK_USER: &str = "jovyan";

    /// Role tokens that grant admin rights
    pub const ADMIN_ROLES: [&str; 2] = ["admin", "hyradus"];
}

/// Default file names, relative to the config directory
pub mod files {
    pub const IMAGE_LIST: &str = "imagelist";
    pub const USER_LIST: &str = "userlist";
}
