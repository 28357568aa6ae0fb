/// PostgreSQL 表结构，可重复执行
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS nodes (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    ip_address TEXT NOT NULL UNIQUE,
    community TEXT NOT NULL DEFAULT 'public',
    manage BOOLEAN NOT NULL DEFAULT TRUE,
    timeout_ms INTEGER,
    sys_name TEXT,
    sys_object_id TEXT,
    snmp_last_dt TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS node_groups (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    description TEXT,
    created_at TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS node_group_refs (
    id BIGSERIAL PRIMARY KEY,
    group_id BIGINT NOT NULL REFERENCES node_groups(id) ON DELETE CASCADE,
    node_id BIGINT NOT NULL REFERENCES nodes(id) ON DELETE CASCADE,
    UNIQUE (group_id, node_id)
);

CREATE TABLE IF NOT EXISTS requests (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    oid TEXT NOT NULL,
    request_type TEXT NOT NULL DEFAULT 'GET',
    prefix TEXT,
    postfix TEXT,
    manage BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS request_groups (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    handler TEXT NOT NULL DEFAULT 'snmp',
    element_type TEXT NOT NULL DEFAULT 'generic',
    full_walk BOOLEAN NOT NULL DEFAULT FALSE,
    manage BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS request_group_refs (
    id BIGSERIAL PRIMARY KEY,
    group_id BIGINT NOT NULL REFERENCES request_groups(id) ON DELETE CASCADE,
    request_id BIGINT NOT NULL REFERENCES requests(id) ON DELETE CASCADE,
    position INTEGER NOT NULL DEFAULT 0,
    timeout_ms INTEGER,
    UNIQUE (group_id, request_id)
);

CREATE TABLE IF NOT EXISTS tasks (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    node_group_id BIGINT REFERENCES node_groups(id) ON DELETE SET NULL,
    request_group_id BIGINT REFERENCES request_groups(id) ON DELETE SET NULL,
    manage BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS crontab (
    id BIGSERIAL PRIMARY KEY,
    task_id BIGINT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
    minutes INTEGER,
    hours INTEGER,
    days INTEGER,
    startdt TIMESTAMPTZ,
    lastdt TIMESTAMPTZ,
    status TEXT NOT NULL DEFAULT 'ACTIVE',
    agent TEXT,
    j_id BIGINT,
    lease_owner TEXT,
    lease_expires_at TIMESTAMPTZ,
    claim_version BIGINT NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_crontab_status ON crontab(status);

CREATE TABLE IF NOT EXISTS journals (
    id BIGSERIAL PRIMARY KEY,
    task_id BIGINT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
    crontab_id BIGINT REFERENCES crontab(id) ON DELETE SET NULL,
    startdt TIMESTAMPTZ NOT NULL,
    enddt TIMESTAMPTZ,
    abandoned BOOLEAN NOT NULL DEFAULT FALSE
);

CREATE INDEX IF NOT EXISTS idx_journals_task ON journals(task_id);

CREATE TABLE IF NOT EXISTS elements (
    id BIGSERIAL PRIMARY KEY,
    node_id BIGINT NOT NULL REFERENCES nodes(id) ON DELETE CASCADE,
    element_type TEXT NOT NULL,
    idx TEXT NOT NULL,
    name TEXT,
    deleted BOOLEAN NOT NULL DEFAULT FALSE,
    first_seen TIMESTAMPTZ NOT NULL,
    last_seen TIMESTAMPTZ NOT NULL,
    UNIQUE (node_id, element_type, idx)
);

CREATE TABLE IF NOT EXISTS results (
    id BIGSERIAL PRIMARY KEY,
    journal_id BIGINT NOT NULL REFERENCES journals(id) ON DELETE CASCADE,
    node_id BIGINT NOT NULL REFERENCES nodes(id) ON DELETE CASCADE,
    request_id BIGINT NOT NULL REFERENCES requests(id) ON DELETE CASCADE,
    element_id BIGINT REFERENCES elements(id) ON DELETE SET NULL,
    element_index TEXT,
    val TEXT,
    cval TEXT,
    duration_ms BIGINT NOT NULL,
    err TEXT,
    dt TIMESTAMPTZ NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_results_journal ON results(journal_id);

CREATE TABLE IF NOT EXISTS interfaces (
    id BIGSERIAL PRIMARY KEY,
    node_id BIGINT NOT NULL REFERENCES nodes(id) ON DELETE CASCADE,
    if_index INTEGER NOT NULL,
    name TEXT,
    descr TEXT,
    alias TEXT,
    if_type INTEGER,
    mtu INTEGER,
    speed BIGINT,
    phys_address TEXT,
    admin_status INTEGER,
    oper_status INTEGER,
    last_change BIGINT,
    first_seen TIMESTAMPTZ NOT NULL,
    last_seen TIMESTAMPTZ NOT NULL,
    status TEXT NOT NULL DEFAULT 'ACTIVE',
    UNIQUE (node_id, if_index)
);

CREATE TABLE IF NOT EXISTS interface_ips (
    id BIGSERIAL PRIMARY KEY,
    node_id BIGINT NOT NULL REFERENCES nodes(id) ON DELETE CASCADE,
    if_index INTEGER NOT NULL,
    ip_address TEXT NOT NULL,
    netmask TEXT,
    first_seen TIMESTAMPTZ NOT NULL,
    last_seen TIMESTAMPTZ NOT NULL,
    status TEXT NOT NULL DEFAULT 'ACTIVE',
    UNIQUE (node_id, if_index, ip_address)
);

CREATE TABLE IF NOT EXISTS mac_addresses (
    id BIGSERIAL PRIMARY KEY,
    node_id BIGINT NOT NULL REFERENCES nodes(id) ON DELETE CASCADE,
    mac_address TEXT NOT NULL,
    port_number INTEGER,
    vlan_id INTEGER,
    fdb_status INTEGER,
    first_seen TIMESTAMPTZ NOT NULL,
    last_seen TIMESTAMPTZ NOT NULL,
    status TEXT NOT NULL DEFAULT 'ACTIVE'
);

CREATE UNIQUE INDEX IF NOT EXISTS ux_mac_addresses_active
    ON mac_addresses(node_id, mac_address) WHERE status = 'ACTIVE';

CREATE TABLE IF NOT EXISTS arp_entries (
    id BIGSERIAL PRIMARY KEY,
    node_id BIGINT NOT NULL REFERENCES nodes(id) ON DELETE CASCADE,
    ip_address TEXT NOT NULL,
    mac_address TEXT NOT NULL,
    if_index INTEGER,
    first_seen TIMESTAMPTZ NOT NULL,
    last_seen TIMESTAMPTZ NOT NULL,
    status TEXT NOT NULL DEFAULT 'ACTIVE'
);

CREATE UNIQUE INDEX IF NOT EXISTS ux_arp_entries_active
    ON arp_entries(node_id, ip_address, mac_address) WHERE status = 'ACTIVE';
"#;
