diesel::table! {
    repo_data (id) {
        id -> Text,
        kind -> Text,
        etag -> Nullable<Text>,
        size -> Nullable<BigInt>,
        last_modified -> Nullable<Text>,
        data -> Nullable<Binary>,
        updated_at -> Text,
    }
}

diesel::table! {
    apt (id) {
        id -> Integer,
        repo -> Text,
        package -> Text,
        version -> Nullable<Text>,
        architecture -> Nullable<Text>,
        size -> BigInt,
        installed_size -> BigInt,
        priority -> Nullable<Text>,
        section -> Nullable<Text>,
        filename -> Nullable<Text>,
        sha256 -> Nullable<Text>,
        sha1 -> Nullable<Text>,
        md5sum -> Nullable<Text>,
        maintainer -> Nullable<Text>,
        homepage -> Nullable<Text>,
        depends -> Nullable<Text>,
        source -> Nullable<Text>,
        provides -> Nullable<Text>,
        recommends -> Nullable<Text>,
        suggests -> Nullable<Text>,
        conflicts -> Nullable<Text>,
        breaks -> Nullable<Text>,
        replaces -> Nullable<Text>,
        enhances -> Nullable<Text>,
        pre_depends -> Nullable<Text>,
        build_ids -> Nullable<Text>,
        package_type -> Nullable<Text>,
        auto_built_package -> Nullable<Text>,
        multi_arch -> Nullable<Text>,
        description -> Nullable<Text>,
        extra -> Nullable<Text>,
    }
}

diesel::table! {
    yum (id) {
        id -> Integer,
        repo -> Text,
        pkg_key -> Nullable<BigInt>,
        pkg_id -> Nullable<Text>,
        name -> Nullable<Text>,
        arch -> Nullable<Text>,
        version -> Nullable<Text>,
        epoch -> Nullable<Text>,
        release -> Nullable<Text>,
        summary -> Nullable<Text>,
        description -> Nullable<Text>,
        url -> Nullable<Text>,
        time_file -> Nullable<BigInt>,
        time_build -> Nullable<BigInt>,
        rpm_license -> Nullable<Text>,
        rpm_vendor -> Nullable<Text>,
        rpm_group -> Nullable<Text>,
        rpm_buildhost -> Nullable<Text>,
        rpm_sourcerpm -> Nullable<Text>,
        rpm_header_start -> Nullable<BigInt>,
        rpm_header_end -> Nullable<BigInt>,
        rpm_packager -> Nullable<Text>,
        size_package -> Nullable<BigInt>,
        size_installed -> Nullable<BigInt>,
        size_archive -> Nullable<BigInt>,
        location_href -> Nullable<Text>,
        location_base -> Nullable<Text>,
        checksum_type -> Nullable<Text>,
    }
}

diesel::table! {
    package (id) {
        id -> Integer,
        repo -> Text,
        name -> Text,
        os_code -> Text,
        arch -> Text,
        pg -> Nullable<Integer>,
        origin -> Text,
        version -> Text,
        release -> Nullable<Text>,
        file -> Nullable<Text>,
        url -> Nullable<Text>,
        sha256 -> Nullable<Text>,
        size -> BigInt,
        miss -> Bool,
        hide -> Bool,
        warn -> Bool,
    }
}

diesel::allow_tables_to_appear_in_same_query!(repo_data, apt, yum, package,);
