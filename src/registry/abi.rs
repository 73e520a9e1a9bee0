//! Solidity interfaces of the contracts the publisher talks to

#![allow(missing_docs)]

use alloy_sol_types::sol;

sol! {
    /// Aragon package manager repository
    interface ApmRepo {
        function newVersion(uint16[3] newSemanticVersion, address contractAddress, bytes contentURI) external;
        function getLatest() external view returns (uint16[3] semanticVersion, address contractAddress, bytes contentURI);
        function canPerform(address who, bytes32 what, uint256[] how) external view returns (bool);
    }

    /// Aragon package manager registry
    interface ApmRegistry {
        function newRepoWithVersion(string name, address dev, uint16[3] initialSemanticVersion, address contractAddress, bytes contentURI) external returns (address);
    }

    /// DAppNode package manager repository
    interface DpmRepo {
        function newVersion(string version, string[] contentURIs) external;
        function CREATE_VERSION_ROLE() external view returns (bytes32);
        function hasRole(bytes32 role, address account) external view returns (bool);
    }

    /// DAppNode package manager registry
    interface DpmRegistry {
        function newPackageWithVersion(string name, address dev, uint8 flags, string version, string[] contentURIs) external;
        function registryName() external view returns (string);
        function getPackage(string name) external view returns (uint8 flags, address repo);
        function ADD_PACKAGE_ROLE() external view returns (bytes32);
        function hasRole(bytes32 role, address account) external view returns (bool);
    }

    /// ENS registry
    interface EnsRegistry {
        function resolver(bytes32 node) external view returns (address);
    }

    /// ENS public resolver
    interface EnsPublicResolver {
        function addr(bytes32 node) external view returns (address);
    }

    /// Aragon access control list
    interface Acl {
        function getPermissionManager(address app, bytes32 role) external view returns (address);
        function grantPermission(address entity, address app, bytes32 role) external;
        function setPermissionManager(address newManager, address app, bytes32 role) external;
    }
}
