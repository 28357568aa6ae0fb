/// SQLite 表结构，可重复执行
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS nodes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    ip_address TEXT NOT NULL UNIQUE,
    community TEXT NOT NULL DEFAULT 'public',
    manage BOOLEAN NOT NULL DEFAULT 1,
    timeout_ms INTEGER,
    sys_name TEXT,
    sys_object_id TEXT,
    snmp_last_dt TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS node_groups (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    description TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS node_group_refs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    group_id INTEGER NOT NULL REFERENCES node_groups(id) ON DELETE CASCADE,
    node_id INTEGER NOT NULL REFERENCES nodes(id) ON DELETE CASCADE,
    UNIQUE (group_id, node_id)
);

CREATE TABLE IF NOT EXISTS requests (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    oid TEXT NOT NULL,
    request_type TEXT NOT NULL DEFAULT 'GET',
    prefix TEXT,
    postfix TEXT,
    manage BOOLEAN NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS request_groups (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    handler TEXT NOT NULL DEFAULT 'snmp',
    element_type TEXT NOT NULL DEFAULT 'generic',
    full_walk BOOLEAN NOT NULL DEFAULT 0,
    manage BOOLEAN NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS request_group_refs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    group_id INTEGER NOT NULL REFERENCES request_groups(id) ON DELETE CASCADE,
    request_id INTEGER NOT NULL REFERENCES requests(id) ON DELETE CASCADE,
    position INTEGER NOT NULL DEFAULT 0,
    timeout_ms INTEGER,
    UNIQUE (group_id, request_id)
);

CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    node_group_id INTEGER REFERENCES node_groups(id) ON DELETE SET NULL,
    request_group_id INTEGER REFERENCES request_groups(id) ON DELETE SET NULL,
    manage BOOLEAN NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS crontab (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
    minutes INTEGER,
    hours INTEGER,
    days INTEGER,
    startdt TEXT,
    lastdt TEXT,
    status TEXT NOT NULL DEFAULT 'ACTIVE',
    agent TEXT,
    j_id INTEGER,
    lease_owner TEXT,
    lease_expires_at TEXT,
    claim_version INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_crontab_status ON crontab(status);

CREATE TABLE IF NOT EXISTS journals (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
    crontab_id INTEGER REFERENCES crontab(id) ON DELETE SET NULL,
    startdt TEXT NOT NULL,
    enddt TEXT,
    abandoned BOOLEAN NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_journals_task ON journals(task_id);

CREATE TABLE IF NOT EXISTS elements (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    node_id INTEGER NOT NULL REFERENCES nodes(id) ON DELETE CASCADE,
    element_type TEXT NOT NULL,
    idx TEXT NOT NULL,
    name TEXT,
    deleted BOOLEAN NOT NULL DEFAULT 0,
    first_seen TEXT NOT NULL,
    last_seen TEXT NOT NULL,
    UNIQUE (node_id, element_type, idx)
);

CREATE TABLE IF NOT EXISTS results (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    journal_id INTEGER NOT NULL REFERENCES journals(id) ON DELETE CASCADE,
    node_id INTEGER NOT NULL REFERENCES nodes(id) ON DELETE CASCADE,
    request_id INTEGER NOT NULL REFERENCES requests(id) ON DELETE CASCADE,
    element_id INTEGER REFERENCES elements(id) ON DELETE SET NULL,
    element_index TEXT,
    val TEXT,
    cval TEXT,
    duration_ms INTEGER NOT NULL,
    err TEXT,
    dt TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_results_journal ON results(journal_id);

CREATE TABLE IF NOT EXISTS interfaces (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    node_id INTEGER NOT NULL REFERENCES nodes(id) ON DELETE CASCADE,
    if_index INTEGER NOT NULL,
    name TEXT,
    descr TEXT,
    alias TEXT,
    if_type INTEGER,
    mtu INTEGER,
    speed INTEGER,
    phys_address TEXT,
    admin_status INTEGER,
    oper_status INTEGER,
    last_change INTEGER,
    first_seen TEXT NOT NULL,
    last_seen TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'ACTIVE',
    UNIQUE (node_id, if_index)
);

CREATE TABLE IF NOT EXISTS interface_ips (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    node_id INTEGER NOT NULL REFERENCES nodes(id) ON DELETE CASCADE,
    if_index INTEGER NOT NULL,
    ip_address TEXT NOT NULL,
    netmask TEXT,
    first_seen TEXT NOT NULL,
    last_seen TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'ACTIVE',
    UNIQUE (node_id, if_index, ip_address)
);

CREATE TABLE IF NOT EXISTS mac_addresses (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    node_id INTEGER NOT NULL REFERENCES nodes(id) ON DELETE CASCADE,
    mac_address TEXT NOT NULL,
    port_number INTEGER,
    vlan_id INTEGER,
    fdb_status INTEGER,
    first_seen TEXT NOT NULL,
    last_seen TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'ACTIVE'
);

CREATE UNIQUE INDEX IF NOT EXISTS ux_mac_addresses_active
    ON mac_addresses(node_id, mac_address) WHERE status = 'ACTIVE';

CREATE TABLE IF NOT EXISTS arp_entries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    node_id INTEGER NOT NULL REFERENCES nodes(id) ON DELETE CASCADE,
    ip_address TEXT NOT NULL,
    mac_address TEXT NOT NULL,
    if_index INTEGER,
    first_seen TEXT NOT NULL,
    last_seen TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'ACTIVE'
);

CREATE UNIQUE INDEX IF NOT EXISTS ux_arp_entries_active
    ON arp_entries(node_id, ip_address, mac_address) WHERE status = 'ACTIVE';
"#;
